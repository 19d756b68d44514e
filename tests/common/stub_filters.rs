use lidar_mcc::filter::{FilterRequest, OutlierFilter, Partition};
use lidar_mcc::{MccError, Point, PointSet, Result};
use std::cell::{Cell, RefCell};

/// Flags `floor(n / divisor)` points per call while at least `floor` points
/// remain, none afterwards. The flagged points are the last ones in the set.
pub struct FractionFilter {
    pub divisor: usize,
    pub floor: usize,
    pub calls: Cell<usize>,
    pub inputs: RefCell<Vec<usize>>,
}

impl FractionFilter {
    pub fn new(divisor: usize, floor: usize) -> Self {
        Self {
            divisor,
            floor,
            calls: Cell::new(0),
            inputs: RefCell::new(Vec::new()),
        }
    }
}

impl OutlierFilter for FractionFilter {
    fn classify(&self, points: PointSet, _request: &FilterRequest) -> Result<Partition> {
        self.calls.set(self.calls.get() + 1);
        let n = points.count();
        self.inputs.borrow_mut().push(n);
        let ng = if n >= self.floor { n / self.divisor } else { 0 };
        let mut pts = points.into_points();
        let outliers = pts.split_off(n - ng);
        Ok(Partition {
            outliers: PointSet::from_points(outliers),
            inliers: PointSet::from_points(pts),
        })
    }
}

/// Fails with an interpolation error on call `fail_on` (1-based).
pub struct FailingFilter {
    pub fail_on: usize,
    pub calls: Cell<usize>,
}

impl FailingFilter {
    pub fn new(fail_on: usize) -> Self {
        Self {
            fail_on,
            calls: Cell::new(0),
        }
    }
}

impl OutlierFilter for FailingFilter {
    fn classify(&self, points: PointSet, _request: &FilterRequest) -> Result<Partition> {
        let call = self.calls.get() + 1;
        self.calls.set(call);
        if call >= self.fail_on {
            return Err(MccError::Interpolation(format!(
                "degenerate surface on call {call}"
            )));
        }
        let mut pts = points.into_points();
        let keep = pts.len() / 2;
        let outliers = pts.split_off(keep);
        Ok(Partition {
            outliers: PointSet::from_points(outliers),
            inliers: PointSet::from_points(pts),
        })
    }
}

/// `n` points on a jittered lattice with unit spacing and distinct heights.
pub fn lattice(n: usize) -> PointSet {
    let side = (n as f64).sqrt().ceil() as usize;
    (0..n)
        .map(|i| {
            let (r, c) = (i / side, i % side);
            Point::new(
                c as f64 + 0.01 * r as f64,
                r as f64 + 0.01 * c as f64,
                i as f64 * 1e-3,
            )
        })
        .collect()
}
