//! Copying month-specific figures onto categories already in the tree.

use crate::ynab::Category;
use std::fmt;
use std::str::FromStr;

/// Which fields a successful month lookup overwrites.
///
/// The category `id` is never overwritten. The target is updated field by
/// field so every holder of that category observes the new values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// Monetary and goal fields plus name, note, hidden/deleted flags and
    /// group linkage.
    #[default]
    Full,
    /// Monetary and goal fields only.
    MonthlyFigures,
}

impl MergePolicy {
    pub fn apply(&self, target: &mut Category, fetched: Category) {
        let Category {
            id: _,
            category_group_id,
            name,
            hidden,
            original_category_group_id,
            note,
            budgeted,
            activity,
            balance,
            goal_type,
            goal_creation_month,
            goal_target,
            goal_target_month,
            goal_percentage_complete,
            deleted,
        } = fetched;

        target.budgeted = budgeted;
        target.activity = activity;
        target.balance = balance;
        target.goal_type = goal_type;
        target.goal_creation_month = goal_creation_month;
        target.goal_target = goal_target;
        target.goal_target_month = goal_target_month;
        target.goal_percentage_complete = goal_percentage_complete;

        if *self == MergePolicy::Full {
            target.category_group_id = category_group_id;
            target.original_category_group_id = original_category_group_id;
            target.name = name;
            target.note = note;
            target.hidden = hidden;
            target.deleted = deleted;
        }
    }
}

impl FromStr for MergePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(MergePolicy::Full),
            "monthly" | "monthly_figures" | "monthly-figures" => Ok(MergePolicy::MonthlyFigures),
            other => Err(format!(
                "unknown merge policy {:?} (expected \"full\" or \"monthly\")",
                other
            )),
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergePolicy::Full => write!(f, "full"),
            MergePolicy::MonthlyFigures => write!(f, "monthly"),
        }
    }
}
