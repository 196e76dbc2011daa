use chrono::{Local, NaiveDate};
use tracing::{debug, warn};

use crate::error::{FinflowError, Result};
use crate::metrics;
use crate::models::{Account, Bill, Category, FinanceState, Theme, Transaction};
use crate::storage::{Storage, STATE_KEY};
use crate::validation::{
    check_account, check_bill, check_category, check_currency_code, check_transaction,
    validate_finance_state,
};

/// Every way the finance state can change.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AddTransaction(Transaction),
    UpdateTransaction(Transaction),
    DeleteTransaction(String),
    AddCategory(Category),
    UpdateCategory(Category),
    DeleteCategory(String),
    AddAccount(Account),
    UpdateAccount(Account),
    DeleteAccount(String),
    AddBill(Bill),
    UpdateBill(Bill),
    DeleteBill(String),
    SetBaseCurrency(String),
    SetTheme(Theme),
    LoadState(FinanceState),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::AddTransaction(_) => "add_transaction",
            Action::UpdateTransaction(_) => "update_transaction",
            Action::DeleteTransaction(_) => "delete_transaction",
            Action::AddCategory(_) => "add_category",
            Action::UpdateCategory(_) => "update_category",
            Action::DeleteCategory(_) => "delete_category",
            Action::AddAccount(_) => "add_account",
            Action::UpdateAccount(_) => "update_account",
            Action::DeleteAccount(_) => "delete_account",
            Action::AddBill(_) => "add_bill",
            Action::UpdateBill(_) => "update_bill",
            Action::DeleteBill(_) => "delete_bill",
            Action::SetBaseCurrency(_) => "set_base_currency",
            Action::SetTheme(_) => "set_theme",
            Action::LoadState(_) => "load_state",
        }
    }
}

// ---------------------------------------------------------------------------
// Reducer
// ---------------------------------------------------------------------------

trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Transaction {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Category {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Account {
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Bill {
    fn key(&self) -> &str {
        &self.id
    }
}

fn replace_by_id<T: Keyed>(items: &mut [T], record: T) {
    if let Some(slot) = items.iter_mut().find(|item| item.key() == record.key()) {
        *slot = record;
    }
}

fn remove_by_id<T: Keyed>(items: &mut Vec<T>, id: &str) {
    if let Some(pos) = items.iter().position(|item| item.key() == id) {
        items.remove(pos);
    }
}

/// Pure state transition. Never fails: updates and deletes of unknown ids
/// leave the state as it was, and no cross-collection references are checked.
pub fn reduce(mut state: FinanceState, action: Action) -> FinanceState {
    match action {
        Action::AddTransaction(t) => state.transactions.insert(0, t),
        Action::UpdateTransaction(t) => replace_by_id(&mut state.transactions, t),
        Action::DeleteTransaction(id) => remove_by_id(&mut state.transactions, &id),
        Action::AddCategory(c) => state.categories.push(c),
        Action::UpdateCategory(c) => replace_by_id(&mut state.categories, c),
        Action::DeleteCategory(id) => remove_by_id(&mut state.categories, &id),
        Action::AddAccount(a) => state.accounts.push(a),
        Action::UpdateAccount(a) => replace_by_id(&mut state.accounts, a),
        Action::DeleteAccount(id) => remove_by_id(&mut state.accounts, &id),
        Action::AddBill(b) => state.bills.push(b),
        Action::UpdateBill(b) => replace_by_id(&mut state.bills, b),
        Action::DeleteBill(id) => remove_by_id(&mut state.bills, &id),
        Action::SetBaseCurrency(code) => state.base_currency = code,
        Action::SetTheme(theme) => state.theme = theme,
        Action::LoadState(loaded) => return loaded,
    }
    state
}

fn ensure_new_id<T: Keyed>(items: &[T], id: &str) -> Result<()> {
    if items.iter().any(|item| item.key() == id) {
        return Err(FinflowError::DuplicateId(id.to_string()));
    }
    Ok(())
}

/// Form-level checks applied before a transition is allowed through.
fn check_action(state: &FinanceState, action: &Action) -> Result<()> {
    match action {
        Action::AddTransaction(t) => {
            check_transaction(t)?;
            ensure_new_id(&state.transactions, &t.id)
        }
        Action::UpdateTransaction(t) => check_transaction(t),
        Action::AddCategory(c) => {
            check_category(c)?;
            ensure_new_id(&state.categories, &c.id)
        }
        Action::UpdateCategory(c) => check_category(c),
        Action::AddAccount(a) => {
            check_account(a)?;
            ensure_new_id(&state.accounts, &a.id)
        }
        Action::UpdateAccount(a) => check_account(a),
        Action::AddBill(b) => {
            check_bill(b)?;
            ensure_new_id(&state.bills, &b.id)
        }
        Action::UpdateBill(b) => check_bill(b),
        Action::SetBaseCurrency(code) => check_currency_code(code),
        Action::LoadState(loaded) => {
            let raw = serde_json::to_value(loaded)?;
            validate_finance_state(raw).map(|_| ())
        }
        Action::DeleteTransaction(_)
        | Action::DeleteCategory(_)
        | Action::DeleteAccount(_)
        | Action::DeleteBill(_)
        | Action::SetTheme(_) => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// The local calendar date; everything "this month" is measured from it.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// The finance state plus the storage it is mirrored to. Build one per
/// process and hand it to whatever needs to read or change the state.
pub struct Store<S: Storage> {
    state: FinanceState,
    storage: S,
}

/// Fill in the built-in categories and accounts when saved data has none.
fn merge_with_defaults(loaded: FinanceState) -> FinanceState {
    let defaults = FinanceState::default();
    FinanceState {
        categories: if loaded.categories.is_empty() {
            defaults.categories
        } else {
            loaded.categories
        },
        accounts: if loaded.accounts.is_empty() {
            defaults.accounts
        } else {
            loaded.accounts
        },
        ..loaded
    }
}

impl<S: Storage> Store<S> {
    /// Start from the defaults and rehydrate from storage if the saved data
    /// validates. Invalid data is removed and the defaults are kept.
    pub fn open(mut storage: S) -> Result<Self> {
        let mut state = FinanceState::default();

        if let Some(saved) = storage.get_item(STATE_KEY)? {
            let parsed = serde_json::from_str::<serde_json::Value>(&saved)
                .map_err(FinflowError::from)
                .and_then(validate_finance_state);
            match parsed {
                Ok(loaded) => {
                    debug!(
                        transactions = loaded.transactions.len(),
                        bills = loaded.bills.len(),
                        "rehydrated saved state"
                    );
                    state = reduce(state, Action::LoadState(merge_with_defaults(loaded)));
                }
                Err(e) => {
                    warn!(error = %e, "invalid saved data, using defaults");
                    storage.remove_item(STATE_KEY)?;
                }
            }
        }

        Self::persist(&mut storage, &state)?;
        Ok(Self { state, storage })
    }

    /// Remove the saved state and start over from the defaults.
    pub fn clear(mut self) -> Result<Self> {
        self.storage.remove_item(STATE_KEY)?;
        debug!("cleared saved state");
        Self::open(self.storage)
    }

    pub fn state(&self) -> &FinanceState {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Check, apply and persist one action. The new state is only kept once it
    /// has been written, so a rejected action or a failed write leaves both the
    /// state and storage untouched.
    pub fn dispatch(&mut self, action: Action) -> Result<()> {
        check_action(&self.state, &action)?;
        let name = action.name();
        let next = reduce(self.state.clone(), action);
        Self::persist(&mut self.storage, &next)?;
        debug!(action = name, "applied action");
        self.state = next;
        Ok(())
    }

    fn persist(storage: &mut S, state: &FinanceState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        storage.set_item(STATE_KEY, &json)?;
        debug!(bytes = json.len(), "persisted state");
        Ok(())
    }

    // -- lookups -----------------------------------------------------------

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.state.transactions.iter().find(|t| t.id == id)
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.state.categories.iter().find(|c| c.id == id)
    }

    pub fn account(&self, id: &str) -> Option<&Account> {
        self.state.accounts.iter().find(|a| a.id == id)
    }

    pub fn category_named(&self, name: &str) -> Option<&Category> {
        self.state
            .categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn account_named(&self, name: &str) -> Option<&Account> {
        self.state
            .accounts
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
    }

    pub fn bill(&self, id: &str) -> Option<&Bill> {
        self.state.bills.iter().find(|b| b.id == id)
    }

    // -- headline figures against the wall clock ---------------------------

    pub fn total_balance(&self) -> f64 {
        metrics::total_balance(&self.state.transactions)
    }

    pub fn monthly_income(&self) -> f64 {
        metrics::monthly_income(&self.state.transactions, today())
    }

    pub fn monthly_expense(&self) -> f64 {
        metrics::monthly_expense(&self.state.transactions, today())
    }

    pub fn net_worth(&self) -> f64 {
        metrics::net_worth(&self.state.accounts, &self.state.transactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AccountType, BillFrequency, CategoryIcon, CategoryType, TransactionType};
    use crate::storage::MemoryStorage;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Memory storage whose writes start failing once `broken` is set.
    struct FlakyStorage {
        inner: MemoryStorage,
        broken: Rc<Cell<bool>>,
    }

    impl Storage for FlakyStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>> {
            self.inner.get_item(key)
        }

        fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
            if self.broken.get() {
                return Err(FinflowError::Other("disk full".to_string()));
            }
            self.inner.set_item(key, value)
        }

        fn remove_item(&mut self, key: &str) -> Result<()> {
            self.inner.remove_item(key)
        }
    }

    fn txn(id: &str, amount: f64, kind: TransactionType) -> Transaction {
        Transaction {
            id: id.to_string(),
            amount,
            description: format!("txn {id}"),
            date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            transaction_type: kind,
            category: "Food".to_string(),
            account: "Cash".to_string(),
            currency: "INR".to_string(),
        }
    }

    fn bill(id: &str) -> Bill {
        Bill {
            id: id.to_string(),
            name: "Internet".to_string(),
            amount: 999.0,
            due_date: NaiveDate::from_ymd_opt(2025, 2, 5).unwrap(),
            category: "Utilities".to_string(),
            is_paid: false,
            is_recurring: true,
            frequency: BillFrequency::Monthly,
        }
    }

    fn store() -> Store<MemoryStorage> {
        Store::open(MemoryStorage::new()).unwrap()
    }

    #[test]
    fn test_add_transaction_prepends() {
        let state = reduce(FinanceState::default(), Action::AddTransaction(txn("a", 1.0, TransactionType::Income)));
        let state = reduce(state, Action::AddTransaction(txn("b", 2.0, TransactionType::Income)));
        let ids: Vec<&str> = state.transactions.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_total_balance_tracks_additions() {
        for (kind, delta) in [
            (TransactionType::Income, 75.5),
            (TransactionType::Expense, -75.5),
            (TransactionType::Other, 0.0),
        ] {
            let mut store = store();
            store.dispatch(Action::AddTransaction(txn("seed", 100.0, TransactionType::Income))).unwrap();
            let before = store.total_balance();
            store.dispatch(Action::AddTransaction(txn("new", 75.5, kind))).unwrap();
            assert_eq!(store.total_balance(), before + delta, "{kind}");
        }
    }

    #[test]
    fn test_update_replaces_only_matching_record() {
        let mut state = FinanceState::default();
        for id in ["a", "b", "c"] {
            state = reduce(state, Action::AddTransaction(txn(id, 10.0, TransactionType::Expense)));
        }
        let mut changed = txn("b", 99.0, TransactionType::Income);
        changed.description = "changed".to_string();
        let after = reduce(state.clone(), Action::UpdateTransaction(changed.clone()));
        assert_eq!(after.transactions.len(), 3);
        assert_eq!(after.transactions[1], changed);
        assert_eq!(after.transactions[0], state.transactions[0]);
        assert_eq!(after.transactions[2], state.transactions[2]);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let state = reduce(FinanceState::default(), Action::AddBill(bill("b1")));
        let after = reduce(state.clone(), Action::UpdateBill(bill("missing")));
        assert_eq!(after, state);
    }

    #[test]
    fn test_delete_removes_exactly_one() {
        let mut state = FinanceState::default();
        for id in ["a", "b", "c", "d"] {
            state = reduce(state, Action::AddTransaction(txn(id, 10.0, TransactionType::Expense)));
        }
        let after = reduce(state.clone(), Action::DeleteTransaction("c".to_string()));
        assert_eq!(after.transactions.len(), state.transactions.len() - 1);
        assert!(after.transactions.iter().all(|t| t.id != "c"));
        for t in &after.transactions {
            let before = state.transactions.iter().find(|o| o.id == t.id).unwrap();
            assert_eq!(t, before);
        }
        let again = reduce(after.clone(), Action::DeleteTransaction("c".to_string()));
        assert_eq!(again, after);
    }

    #[test]
    fn test_delete_category_keeps_transaction_labels() {
        let mut store = store();
        store.dispatch(Action::AddTransaction(txn("t1", 50.0, TransactionType::Expense))).unwrap();
        let food_id = store.category_named("Food").unwrap().id.clone();
        store.dispatch(Action::DeleteCategory(food_id)).unwrap();
        assert!(store.category_named("Food").is_none());
        assert_eq!(store.state().transactions[0].category, "Food");
    }

    #[test]
    fn test_dispatch_rejects_invalid_payload() {
        let mut store = store();
        let err = store
            .dispatch(Action::AddTransaction(txn("t1", 20_000_000.0, TransactionType::Expense)))
            .unwrap_err();
        assert!(matches!(err, FinflowError::Validation(_)));
        assert!(store.state().transactions.is_empty());

        let mut card = Account {
            id: "card".to_string(),
            name: "Card".to_string(),
            account_type: AccountType::Credit,
            balance: 0.0,
            currency: "INR".to_string(),
            card_number_last4: Some("4111111111111111".to_string()),
            brand: None,
        };
        assert!(store.dispatch(Action::AddAccount(card.clone())).is_err());
        card.card_number_last4 = Some("1111".to_string());
        store.dispatch(Action::AddAccount(card)).unwrap();
    }

    #[test]
    fn test_dispatch_rejects_duplicate_ids() {
        let mut store = store();
        let category = Category {
            id: "1".to_string(),
            name: "Pets".to_string(),
            icon: CategoryIcon::Dog,
            color: "#0EA5E9".to_string(),
            category_type: CategoryType::Expense,
        };
        let err = store.dispatch(Action::AddCategory(category)).unwrap_err();
        assert!(matches!(err, FinflowError::DuplicateId(id) if id == "1"));
    }

    #[test]
    fn test_set_scalars() {
        let mut store = store();
        store.dispatch(Action::SetBaseCurrency("USD".to_string())).unwrap();
        store.dispatch(Action::SetTheme(Theme::Dark)).unwrap();
        assert_eq!(store.state().base_currency, "USD");
        assert_eq!(store.state().theme, Theme::Dark);
        assert!(store.dispatch(Action::SetBaseCurrency(String::new())).is_err());
    }

    #[test]
    fn test_every_dispatch_persists() {
        let mut store = store();
        store.dispatch(Action::AddBill(bill("b1"))).unwrap();
        let saved = store.storage().get_item(STATE_KEY).unwrap().unwrap();
        let reloaded: FinanceState = serde_json::from_str(&saved).unwrap();
        assert_eq!(&reloaded, store.state());
    }

    #[test]
    fn test_rehydrates_from_storage() {
        let mut first = store();
        first.dispatch(Action::AddTransaction(txn("t1", 500.0, TransactionType::Income))).unwrap();
        first.dispatch(Action::SetTheme(Theme::Light)).unwrap();
        let storage = first.storage().clone();

        let second = Store::open(storage).unwrap();
        assert_eq!(second.state(), first.state());
    }

    #[test]
    fn test_round_trip_through_validation() {
        let mut store = store();
        store.dispatch(Action::AddTransaction(txn("t1", 100.5, TransactionType::Income))).unwrap();
        store.dispatch(Action::AddTransaction(txn("t2", 0.1, TransactionType::Expense))).unwrap();
        store.dispatch(Action::AddBill(bill("b1"))).unwrap();
        store.dispatch(Action::DeleteAccount("1".to_string())).unwrap();
        store.dispatch(Action::SetBaseCurrency("EUR".to_string())).unwrap();

        let json = serde_json::to_value(store.state()).unwrap();
        let back = validate_finance_state(json).unwrap();
        assert_eq!(&back, store.state());
    }

    #[test]
    fn test_corrupt_storage_is_cleared() {
        let storage = MemoryStorage::with_item(STATE_KEY, "{not json");
        let store = Store::open(storage).unwrap();
        assert_eq!(store.state(), &FinanceState::default());
        let saved = store.storage().get_item(STATE_KEY).unwrap().unwrap();
        assert_eq!(serde_json::from_str::<FinanceState>(&saved).unwrap(), FinanceState::default());
    }

    #[test]
    fn test_invalid_storage_falls_back_to_defaults() {
        let storage = MemoryStorage::with_item(
            STATE_KEY,
            r#"{"transactions":[{"id":"x","amount":-4,"description":"","date":"2025-01-01","type":"expense","category":"","account":"","currency":"INR"}]}"#,
        );
        let store = Store::open(storage).unwrap();
        assert!(store.state().transactions.is_empty());
        assert_eq!(store.state().categories.len(), 10);
    }

    #[test]
    fn test_empty_saved_collections_get_defaults() {
        let storage = MemoryStorage::with_item(STATE_KEY, r#"{"categories":[],"accounts":[],"baseCurrency":"GBP"}"#);
        let store = Store::open(storage).unwrap();
        assert_eq!(store.state().categories.len(), 10);
        assert_eq!(store.state().accounts.len(), 2);
        assert_eq!(store.state().base_currency, "GBP");
    }

    #[test]
    fn test_net_worth_adds_account_balances() {
        let mut store = store();
        let mut bank = store.account_named("Bank Account").unwrap().clone();
        bank.balance = 1000.0;
        store.dispatch(Action::UpdateAccount(bank)).unwrap();
        store.dispatch(Action::AddTransaction(txn("t1", 200.0, TransactionType::Expense))).unwrap();
        assert_eq!(store.net_worth(), 800.0);
    }

    #[test]
    fn test_failed_write_keeps_previous_state() {
        let broken = Rc::new(Cell::new(false));
        let mut store = Store::open(FlakyStorage {
            inner: MemoryStorage::new(),
            broken: Rc::clone(&broken),
        })
        .unwrap();
        store.dispatch(Action::AddTransaction(txn("t1", 10.0, TransactionType::Income))).unwrap();

        broken.set(true);
        let result = store.dispatch(Action::AddTransaction(txn("t2", 20.0, TransactionType::Income)));
        assert!(matches!(result, Err(FinflowError::Other(_))));
        assert_eq!(store.state().transactions.len(), 1);
        assert!(store.transaction("t2").is_none());

        let saved = store.storage().inner.get_item(STATE_KEY).unwrap().unwrap();
        let reloaded: FinanceState = serde_json::from_str(&saved).unwrap();
        assert_eq!(&reloaded, store.state());
    }

    #[test]
    fn test_clear_restores_defaults() {
        let mut store = store();
        store.dispatch(Action::AddTransaction(txn("t1", 500.0, TransactionType::Expense))).unwrap();
        store.dispatch(Action::DeleteCategory("1".to_string())).unwrap();
        store.dispatch(Action::SetBaseCurrency("USD".to_string())).unwrap();

        let store = store.clear().unwrap();
        assert_eq!(store.state(), &FinanceState::default());
        let saved = store.storage().get_item(STATE_KEY).unwrap().unwrap();
        assert_eq!(serde_json::from_str::<FinanceState>(&saved).unwrap(), FinanceState::default());
    }
}
