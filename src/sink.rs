//! Destinations for finished snapshot rows.

use crate::ynab::{Budget, Category, CategoryGroup};

/// Groups YNAB creates internally; never part of a snapshot.
pub const SPECIAL_GROUP_NAMES: &[&str] = &["Internal Master Category", "Hidden Categories"];

/// One category's figures in a snapshot. Amounts are milliunits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRow {
    pub category_id: String,
    pub budget_id: String,
    pub group_id: String,
    pub name: String,
    pub budgeted: i64,
    pub balance: i64,
}

impl SnapshotRow {
    pub fn new(budget: &Budget, category: &Category) -> Self {
        Self {
            category_id: category.id.clone(),
            budget_id: budget.id.clone(),
            group_id: category.category_group_id.clone(),
            name: category.name.clone(),
            budgeted: category.budgeted,
            balance: category.balance,
        }
    }
}

/// Receives snapshot rows, budget by budget.
pub trait CategorySink: Send {
    /// Called before the rows of `budget`.
    fn begin_budget(&mut self, _budget: &Budget) {}

    fn accept(&mut self, row: SnapshotRow) -> anyhow::Result<()>;
}

/// Logs every row through `tracing`.
#[derive(Debug, Default)]
pub struct TracingSink;

impl CategorySink for TracingSink {
    fn begin_budget(&mut self, budget: &Budget) {
        tracing::info!(budget_id = %budget.id, "Budget: {}", budget.name);
    }

    fn accept(&mut self, row: SnapshotRow) -> anyhow::Result<()> {
        tracing::info!(
            budget_id = %row.budget_id,
            group_id = %row.group_id,
            category_id = %row.category_id,
            budgeted = row.budgeted,
            balance = row.balance,
            "{}",
            row.name
        );
        Ok(())
    }
}

/// Keeps rows in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub budgets: Vec<String>,
    pub rows: Vec<SnapshotRow>,
}

impl CategorySink for MemorySink {
    fn begin_budget(&mut self, budget: &Budget) {
        self.budgets.push(budget.id.clone());
    }

    fn accept(&mut self, row: SnapshotRow) -> anyhow::Result<()> {
        self.rows.push(row);
        Ok(())
    }
}

fn is_visible_group(group: &CategoryGroup) -> bool {
    !group.hidden && !group.deleted && !SPECIAL_GROUP_NAMES.contains(&group.name.as_str())
}

fn is_visible_category(category: &Category, include_empty: bool) -> bool {
    if category.hidden || category.deleted {
        return false;
    }
    include_empty || category.budgeted != 0 || category.balance != 0
}

/// Rows for every visible category of `budget`, in tree order.
///
/// Hidden, deleted and internal groups are skipped, as are hidden or deleted
/// categories. Categories with nothing budgeted and a zero balance are skipped
/// unless `include_empty` is set.
pub fn visible_rows(
    budget: &Budget,
    groups: &[CategoryGroup],
    include_empty: bool,
) -> Vec<SnapshotRow> {
    groups
        .iter()
        .filter(|group| is_visible_group(group))
        .flat_map(|group| group.categories.iter())
        .filter(|category| is_visible_category(category, include_empty))
        .map(|category| SnapshotRow::new(budget, category))
        .collect()
}
