use chrono::{Datelike, Days, Months, NaiveDate};
use serde::Serialize;

use crate::models::{
    Account, AccountType, Bill, Budget, BudgetPeriod, FinanceState, Transaction, TransactionType,
};

// ---------------------------------------------------------------------------
// Headline figures
// ---------------------------------------------------------------------------

pub fn total_balance(transactions: &[Transaction]) -> f64 {
    transactions.iter().map(Transaction::signed_amount).sum()
}

fn same_month(date: NaiveDate, year: i32, month: u32) -> bool {
    date.year() == year && date.month() == month
}

fn sum_of_type_in_month(
    transactions: &[Transaction],
    kind: TransactionType,
    year: i32,
    month: u32,
) -> f64 {
    transactions
        .iter()
        .filter(|t| t.transaction_type == kind && same_month(t.date, year, month))
        .map(|t| t.amount)
        .sum()
}

pub fn monthly_income(transactions: &[Transaction], today: NaiveDate) -> f64 {
    sum_of_type_in_month(transactions, TransactionType::Income, today.year(), today.month())
}

pub fn monthly_expense(transactions: &[Transaction], today: NaiveDate) -> f64 {
    sum_of_type_in_month(transactions, TransactionType::Expense, today.year(), today.month())
}

pub fn net_worth(accounts: &[Account], transactions: &[Transaction]) -> f64 {
    accounts.iter().map(|a| a.balance).sum::<f64>() + total_balance(transactions)
}

/// `part` as a percentage of `total`; 0 when there is no total to divide by.
pub fn percentage(part: f64, total: f64) -> f64 {
    if total == 0.0 || !total.is_finite() {
        0.0
    } else {
        part / total * 100.0
    }
}

// ---------------------------------------------------------------------------
// Category breakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub name: String,
    pub total: f64,
    pub percentage: f64,
}

/// Sum amounts per category name, keeping first-seen order.
fn group_by_category<'a>(transactions: impl Iterator<Item = &'a Transaction>) -> Vec<(String, f64)> {
    let mut groups: Vec<(String, f64)> = Vec::new();
    for t in transactions {
        match groups.iter_mut().find(|(name, _)| *name == t.category) {
            Some((_, total)) => *total += t.amount,
            None => groups.push((t.category.clone(), t.amount)),
        }
    }
    groups
}

fn ranked(groups: Vec<(String, f64)>) -> Vec<CategoryTotal> {
    let grand_total: f64 = groups.iter().map(|(_, t)| t).sum();
    let mut items: Vec<CategoryTotal> = groups
        .into_iter()
        .map(|(name, total)| CategoryTotal {
            name,
            total,
            percentage: percentage(total, grand_total),
        })
        .collect();
    items.sort_by(|a, b| b.total.total_cmp(&a.total));
    items
}

/// Expense totals per category, largest first. Percentages are of all
/// expenses, including categories cut off by `top`.
pub fn category_breakdown(transactions: &[Transaction], top: Option<usize>) -> Vec<CategoryTotal> {
    let expenses = transactions
        .iter()
        .filter(|t| t.transaction_type == TransactionType::Expense);
    let mut items = ranked(group_by_category(expenses));
    if let Some(n) = top {
        items.truncate(n);
    }
    items
}

/// Expense total for one category name. Unknown names sum to zero.
pub fn category_spending(transactions: &[Transaction], category: &str) -> f64 {
    transactions
        .iter()
        .filter(|t| t.transaction_type == TransactionType::Expense && t.category == category)
        .map(|t| t.amount)
        .sum()
}

// ---------------------------------------------------------------------------
// Time series
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub start: NaiveDate,
    pub label: String,
    pub income: f64,
    pub expense: f64,
}

impl SeriesPoint {
    fn empty(start: NaiveDate, label: String) -> Self {
        Self { start, label, income: 0.0, expense: 0.0 }
    }

    fn add(&mut self, t: &Transaction) {
        match t.transaction_type {
            TransactionType::Income => self.income += t.amount,
            TransactionType::Expense => self.expense += t.amount,
            TransactionType::Other => {}
        }
    }
}

/// One bucket per day for the `days` days ending today, oldest first.
pub fn daily_series(transactions: &[Transaction], today: NaiveDate, days: u32) -> Vec<SeriesPoint> {
    if days == 0 {
        return Vec::new();
    }
    let Some(first) = today.checked_sub_days(Days::new(u64::from(days - 1))) else {
        return Vec::new();
    };
    let mut buckets: Vec<SeriesPoint> = first
        .iter_days()
        .take(days as usize)
        .map(|d| SeriesPoint::empty(d, d.format("%b %-d").to_string()))
        .collect();

    for t in transactions {
        if t.date < first || t.date > today {
            continue;
        }
        let idx = (t.date - first).num_days() as usize;
        if let Some(bucket) = buckets.get_mut(idx) {
            bucket.add(t);
        }
    }
    buckets
}

/// One bucket per calendar month for the `months` months ending with the
/// current one, oldest first.
pub fn monthly_series(transactions: &[Transaction], today: NaiveDate, months: u32) -> Vec<SeriesPoint> {
    let Some(this_month) = today.with_day(1) else {
        return Vec::new();
    };
    let mut buckets: Vec<SeriesPoint> = (0..months)
        .rev()
        .filter_map(|back| this_month.checked_sub_months(Months::new(back)))
        .map(|start| SeriesPoint::empty(start, start.format("%b").to_string()))
        .collect();

    for t in transactions {
        let bucket = buckets
            .iter_mut()
            .find(|b| same_month(t.date, b.start.year(), b.start.month()));
        if let Some(bucket) = bucket {
            bucket.add(t);
        }
    }
    buckets
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub balance: f64,
}

/// Running balance after each transaction in date order, keeping the last
/// `limit` points.
pub fn balance_trend(transactions: &[Transaction], limit: usize) -> Vec<TrendPoint> {
    let mut sorted: Vec<&Transaction> = transactions.iter().collect();
    sorted.sort_by_key(|t| t.date);

    let mut balance = 0.0;
    let points: Vec<TrendPoint> = sorted
        .into_iter()
        .map(|t| {
            balance += t.signed_amount();
            TrendPoint { date: t.date, balance }
        })
        .collect();
    let skip = points.len().saturating_sub(limit);
    points.into_iter().skip(skip).collect()
}

// ---------------------------------------------------------------------------
// Budgets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub budget: Budget,
    pub spent: f64,
    /// Share of the limit used, capped at 100.
    pub percentage: f64,
    pub remaining: f64,
    pub is_over_budget: bool,
    pub is_near_limit: bool,
}

pub fn period_start(period: BudgetPeriod, today: NaiveDate) -> NaiveDate {
    match period {
        BudgetPeriod::Weekly => today.checked_sub_days(Days::new(7)).unwrap_or(today),
        BudgetPeriod::Monthly => today.with_day(1).unwrap_or(today),
        BudgetPeriod::Yearly => today.with_ordinal(1).unwrap_or(today),
    }
}

pub fn budget_status(budget: &Budget, transactions: &[Transaction], today: NaiveDate) -> BudgetStatus {
    let start = period_start(budget.period, today);
    let spent: f64 = transactions
        .iter()
        .filter(|t| {
            t.transaction_type == TransactionType::Expense
                && t.category == budget.category
                && t.date >= start
        })
        .map(|t| t.amount)
        .sum();
    let used = percentage(spent, budget.limit);

    BudgetStatus {
        budget: budget.clone(),
        spent,
        percentage: used.min(100.0),
        remaining: (budget.limit - spent).max(0.0),
        is_over_budget: spent > budget.limit,
        is_near_limit: (80.0..100.0).contains(&used),
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfitAndLoss {
    pub income: Vec<CategoryTotal>,
    pub expenses: Vec<CategoryTotal>,
    pub total_income: f64,
    pub total_expense: f64,
    pub net_profit: f64,
}

pub fn profit_and_loss(transactions: &[Transaction]) -> ProfitAndLoss {
    let of_type = |kind: TransactionType| {
        ranked(group_by_category(
            transactions.iter().filter(move |t| t.transaction_type == kind),
        ))
    };
    let income = of_type(TransactionType::Income);
    let expenses = of_type(TransactionType::Expense);
    let total_income: f64 = income.iter().map(|i| i.total).sum();
    let total_expense: f64 = expenses.iter().map(|i| i.total).sum();

    ProfitAndLoss {
        income,
        expenses,
        total_income,
        total_expense,
        net_profit: total_income - total_expense,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountBalance {
    pub name: String,
    pub account_type: AccountType,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceSheet {
    pub cash_accounts: Vec<AccountBalance>,
    pub total_assets: f64,
    pub unpaid_bills: f64,
    pub equity: f64,
}

pub fn balance_sheet(state: &FinanceState) -> BalanceSheet {
    let cash_accounts = state
        .accounts
        .iter()
        .filter(|a| matches!(a.account_type, AccountType::Cash | AccountType::Bank))
        .map(|a| AccountBalance {
            name: a.name.clone(),
            account_type: a.account_type,
            balance: a.balance,
        })
        .collect();
    let unpaid_bills = state.bills.iter().filter(|b| !b.is_paid).map(|b| b.amount).sum();
    let total = total_balance(&state.transactions);

    BalanceSheet {
        cash_accounts,
        total_assets: total,
        unpaid_bills,
        equity: total,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthSummary<'a> {
    pub year: i32,
    pub month: u32,
    pub income: f64,
    pub expense: f64,
    pub transactions: Vec<&'a Transaction>,
}

pub fn month_summary(transactions: &[Transaction], year: i32, month: u32) -> MonthSummary<'_> {
    let in_month: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| same_month(t.date, year, month))
        .collect();
    let sum = |kind: TransactionType| -> f64 {
        in_month
            .iter()
            .filter(|t| t.transaction_type == kind)
            .map(|t| t.amount)
            .sum()
    };
    MonthSummary {
        year,
        month,
        income: sum(TransactionType::Income),
        expense: sum(TransactionType::Expense),
        transactions: in_month.clone(),
    }
}

// ---------------------------------------------------------------------------
// Bills
// ---------------------------------------------------------------------------

/// Days from `today` to the due date; negative once overdue.
pub fn days_until_due(bill: &Bill, today: NaiveDate) -> i64 {
    (bill.due_date - today).num_days()
}

#[derive(Debug, Clone, PartialEq)]
pub struct BillSchedule<'a> {
    pub pending: Vec<&'a Bill>,
    pub paid: Vec<&'a Bill>,
    pub total_pending: f64,
}

pub fn bill_schedule(bills: &[Bill]) -> BillSchedule<'_> {
    let (paid, pending): (Vec<&Bill>, Vec<&Bill>) = bills.iter().partition(|b| b.is_paid);
    let total_pending = pending.iter().map(|b| b.amount).sum();
    BillSchedule { pending, paid, total_pending }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BillFrequency;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn txn(amount: f64, kind: TransactionType, category: &str, on: NaiveDate) -> Transaction {
        Transaction {
            id: crate::models::new_id(),
            amount,
            description: String::new(),
            date: on,
            transaction_type: kind,
            category: category.to_string(),
            account: "Cash".to_string(),
            currency: "INR".to_string(),
        }
    }

    fn sample(today: NaiveDate) -> Vec<Transaction> {
        vec![
            txn(50000.0, TransactionType::Income, "Salary", today),
            txn(1200.0, TransactionType::Expense, "Food", today),
            txn(300.0, TransactionType::Expense, "Transport", date(2025, 5, 2)),
            txn(800.0, TransactionType::Expense, "Food", date(2025, 5, 20)),
            txn(999.0, TransactionType::Other, "Transfer", today),
        ]
    }

    #[test]
    fn test_total_balance_ignores_other() {
        let today = date(2025, 6, 15);
        assert_eq!(total_balance(&sample(today)), 50000.0 - 1200.0 - 300.0 - 800.0);
        assert_eq!(total_balance(&[]), 0.0);
    }

    #[test]
    fn test_monthly_income_and_expense() {
        let today = date(2025, 6, 15);
        let txns = sample(today);
        assert_eq!(monthly_income(&txns, today), 50000.0);
        assert_eq!(monthly_expense(&txns, today), 1200.0);
        // Same month of another year does not count.
        let last_year = vec![txn(10.0, TransactionType::Income, "Salary", date(2024, 6, 1))];
        assert_eq!(monthly_income(&last_year, today), 0.0);
    }

    #[test]
    fn test_net_worth() {
        let state = FinanceState::default();
        let mut accounts = state.accounts.clone();
        accounts[0].balance = 2500.0;
        accounts[1].balance = -500.0;
        let txns = vec![txn(100.0, TransactionType::Income, "Salary", date(2025, 1, 1))];
        assert_eq!(net_worth(&accounts, &txns), 2100.0);
    }

    #[test]
    fn test_category_breakdown_sorted_and_truncated() {
        let today = date(2025, 6, 15);
        let items = category_breakdown(&sample(today), None);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name, "Food");
        assert_eq!(items[0].total, 2000.0);
        assert_eq!(items[1].name, "Transport");
        assert_eq!(items[0].percentage + items[1].percentage, 100.0);

        let top = category_breakdown(&sample(today), Some(1));
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].percentage, 2000.0 / 2300.0 * 100.0);
    }

    #[test]
    fn test_category_breakdown_empty_without_expenses() {
        let only_income = vec![txn(10.0, TransactionType::Income, "Salary", date(2025, 1, 1))];
        assert!(category_breakdown(&only_income, None).is_empty());
        assert!(category_breakdown(&[], Some(5)).is_empty());
        assert_eq!(percentage(0.0, 0.0), 0.0);
        assert_eq!(percentage(5.0, 0.0), 0.0);
    }

    #[test]
    fn test_category_breakdown_ties_keep_first_seen_order() {
        let d = date(2025, 1, 1);
        let txns = vec![
            txn(10.0, TransactionType::Expense, "Rent", d),
            txn(10.0, TransactionType::Expense, "Food", d),
        ];
        let names: Vec<String> = category_breakdown(&txns, None).into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Rent", "Food"]);
    }

    #[test]
    fn test_category_spending_unknown_is_zero() {
        assert_eq!(category_spending(&sample(date(2025, 6, 15)), "Pets"), 0.0);
    }

    #[test]
    fn test_daily_series_window() {
        let today = date(2025, 6, 15);
        let series = daily_series(&sample(today), today, 30);
        assert_eq!(series.len(), 30);
        assert_eq!(series[0].start, date(2025, 5, 17));
        assert_eq!(series[29].start, today);
        assert_eq!(series[29].label, "Jun 15");
        assert_eq!(series[29].income, 50000.0);
        assert_eq!(series[29].expense, 1200.0);
        // 2025-05-20 is inside the window, 2025-05-02 is not.
        let total_expense: f64 = series.iter().map(|p| p.expense).sum();
        assert_eq!(total_expense, 2000.0);
        assert!(daily_series(&[], today, 0).is_empty());
    }

    #[test]
    fn test_monthly_series_window() {
        let today = date(2025, 6, 15);
        let mut txns = sample(today);
        txns.push(txn(70.0, TransactionType::Expense, "Food", date(2024, 12, 31)));
        let series = monthly_series(&txns, today, 6);
        let labels: Vec<&str> = series.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Jan", "Feb", "Mar", "Apr", "May", "Jun"]);
        assert_eq!(series[4].expense, 1100.0);
        assert_eq!(series[5].income, 50000.0);
        assert_eq!(series.iter().map(|p| p.expense).sum::<f64>(), 2300.0);
    }

    #[test]
    fn test_monthly_series_crosses_year() {
        let series = monthly_series(&[], date(2025, 2, 28), 3);
        let starts: Vec<NaiveDate> = series.iter().map(|p| p.start).collect();
        assert_eq!(starts, vec![date(2024, 12, 1), date(2025, 1, 1), date(2025, 2, 1)]);
    }

    #[test]
    fn test_balance_trend() {
        let txns = vec![
            txn(30.0, TransactionType::Expense, "Food", date(2025, 1, 3)),
            txn(100.0, TransactionType::Income, "Salary", date(2025, 1, 1)),
            txn(20.0, TransactionType::Expense, "Food", date(2025, 1, 2)),
        ];
        let trend = balance_trend(&txns, 30);
        let balances: Vec<f64> = trend.iter().map(|p| p.balance).collect();
        assert_eq!(balances, vec![100.0, 80.0, 50.0]);
        let last_two = balance_trend(&txns, 2);
        assert_eq!(last_two.len(), 2);
        assert_eq!(last_two[0].date, date(2025, 1, 2));
    }

    #[test]
    fn test_budget_near_limit() {
        let today = date(2025, 6, 15);
        let txns = vec![
            txn(5000.0, TransactionType::Expense, "Food", date(2025, 6, 1)),
            txn(3500.0, TransactionType::Expense, "Food", date(2025, 6, 14)),
            txn(9000.0, TransactionType::Expense, "Food", date(2025, 5, 31)),
            txn(400.0, TransactionType::Expense, "Transport", date(2025, 6, 10)),
        ];
        let budget = Budget {
            category: "Food".to_string(),
            limit: 10000.0,
            period: BudgetPeriod::Monthly,
        };
        let status = budget_status(&budget, &txns, today);
        assert_eq!(status.spent, 8500.0);
        assert_eq!(status.percentage, 85.0);
        assert!(status.is_near_limit);
        assert!(!status.is_over_budget);
        assert_eq!(status.remaining, 1500.0);
    }

    #[test]
    fn test_budget_near_limit_band_edges() {
        let today = date(2025, 6, 15);
        let budget = Budget {
            category: "Food".to_string(),
            limit: 10000.0,
            period: BudgetPeriod::Monthly,
        };

        let at_80 = vec![txn(8000.0, TransactionType::Expense, "Food", date(2025, 6, 3))];
        let status = budget_status(&budget, &at_80, today);
        assert_eq!(status.percentage, 80.0);
        assert!(status.is_near_limit);
        assert!(!status.is_over_budget);

        let at_limit = vec![txn(10000.0, TransactionType::Expense, "Food", date(2025, 6, 3))];
        let status = budget_status(&budget, &at_limit, today);
        assert_eq!(status.percentage, 100.0);
        assert_eq!(status.remaining, 0.0);
        assert!(!status.is_near_limit);
        assert!(!status.is_over_budget);
    }

    #[test]
    fn test_budget_over_limit_caps_percentage() {
        let today = date(2025, 6, 15);
        let txns = vec![txn(1500.0, TransactionType::Expense, "Food", date(2025, 6, 10))];
        let budget = Budget {
            category: "Food".to_string(),
            limit: 1000.0,
            period: BudgetPeriod::Weekly,
        };
        let status = budget_status(&budget, &txns, today);
        assert_eq!(status.percentage, 100.0);
        assert_eq!(status.remaining, 0.0);
        assert!(status.is_over_budget);
        assert!(!status.is_near_limit);
    }

    #[test]
    fn test_budget_zero_limit_is_defined() {
        let budget = Budget {
            category: "Food".to_string(),
            limit: 0.0,
            period: BudgetPeriod::Yearly,
        };
        let status = budget_status(&budget, &[], date(2025, 6, 15));
        assert_eq!(status.percentage, 0.0);
        assert!(!status.is_over_budget);
    }

    #[test]
    fn test_period_start() {
        let today = date(2025, 6, 15);
        assert_eq!(period_start(BudgetPeriod::Weekly, today), date(2025, 6, 8));
        assert_eq!(period_start(BudgetPeriod::Monthly, today), date(2025, 6, 1));
        assert_eq!(period_start(BudgetPeriod::Yearly, today), date(2025, 1, 1));
    }

    #[test]
    fn test_profit_and_loss() {
        let pnl = profit_and_loss(&sample(date(2025, 6, 15)));
        assert_eq!(pnl.total_income, 50000.0);
        assert_eq!(pnl.total_expense, 2300.0);
        assert_eq!(pnl.net_profit, 47700.0);
        assert_eq!(pnl.income.len(), 1);
        assert_eq!(pnl.expenses[0].name, "Food");
    }

    #[test]
    fn test_balance_sheet() {
        let mut state = FinanceState::default();
        state.transactions = sample(date(2025, 6, 15));
        state.bills.push(Bill {
            id: "b1".to_string(),
            name: "Rent".to_string(),
            amount: 15000.0,
            due_date: date(2025, 7, 1),
            category: "Rent".to_string(),
            is_paid: false,
            is_recurring: true,
            frequency: BillFrequency::Monthly,
        });
        let sheet = balance_sheet(&state);
        assert_eq!(sheet.cash_accounts.len(), 2);
        assert_eq!(sheet.unpaid_bills, 15000.0);
        assert_eq!(sheet.total_assets, 47700.0);
        assert_eq!(sheet.equity, 47700.0);
    }

    #[test]
    fn test_month_summary() {
        let txns = sample(date(2025, 6, 15));
        let may = month_summary(&txns, 2025, 5);
        assert_eq!(may.transactions.len(), 2);
        assert_eq!(may.expense, 1100.0);
        assert_eq!(may.income, 0.0);
    }

    #[test]
    fn test_bill_schedule_and_due_days() {
        let today = date(2025, 6, 15);
        let mk = |id: &str, due: NaiveDate, paid: bool| Bill {
            id: id.to_string(),
            name: id.to_string(),
            amount: 100.0,
            due_date: due,
            category: "Utilities".to_string(),
            is_paid: paid,
            is_recurring: false,
            frequency: BillFrequency::Monthly,
        };
        let bills = vec![
            mk("late", date(2025, 6, 10), false),
            mk("soon", date(2025, 6, 18), false),
            mk("done", date(2025, 6, 1), true),
        ];
        assert_eq!(days_until_due(&bills[0], today), -5);
        assert_eq!(days_until_due(&bills[1], today), 3);
        let schedule = bill_schedule(&bills);
        assert_eq!(schedule.pending.len(), 2);
        assert_eq!(schedule.paid.len(), 1);
        assert_eq!(schedule.total_pending, 200.0);
    }
}
