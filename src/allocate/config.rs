//! Allocation configuration.

/// Largest accepted [`AllocationConfig::tolerance`].
pub const MAX_TOLERANCE: f64 = 1e-6;

/// Sort key for first-fit-decreasing within a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AllocationCriterion {
    /// Heaviest orders first.
    #[default]
    Weight,
    /// Bulkiest orders first.
    Volume,
}

/// Configuration for [`LoadAllocator`](super::LoadAllocator).
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllocationConfig {
    pub criterion: AllocationCriterion,

    /// Floating-point slack below which remaining capacity still counts as
    /// enough. At most [`MAX_TOLERANCE`].
    pub tolerance: f64,
}

impl AllocationConfig {
    pub fn with_criterion(mut self, criterion: AllocationCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=MAX_TOLERANCE).contains(&self.tolerance) {
            return Err(format!("tolerance must be within [0, {MAX_TOLERANCE}], got {}", self.tolerance));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let c = AllocationConfig::default();
        assert_eq!(c.criterion, AllocationCriterion::Weight);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn test_negative_tolerance() {
        let c = AllocationConfig {
            tolerance: -1.0,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_tolerance_capped() {
        let c = AllocationConfig {
            tolerance: 0.5,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }
}
