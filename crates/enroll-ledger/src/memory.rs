use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use enroll_types::{Address, LedgerCourseView, Receipt, ReceiptStatus, TxHash};

use crate::error::LedgerError;
use crate::traits::ContractTransport;
use crate::transaction::{ContractAction, SignedTransaction};

/// Flat cost charged for every mined transaction.
pub const BASE_GAS: u64 = 21_000;
/// Additional cost of an `enroll` call.
pub const ENROLL_GAS: u64 = 45_000;
/// Additional cost of an `addCourse` call, before prerequisites.
pub const ADD_COURSE_GAS: u64 = 90_000;
/// Additional cost per stored prerequisite.
pub const PREREQUISITE_GAS: u64 = 20_000;

/// In-memory enrollment contract for tests and a local devnet.
///
/// Mines every accepted transaction immediately into its own block. A
/// transaction that passes signature and nonce checks always consumes its
/// nonce; a contract rule violation turns into a `failure` receipt, the way
/// an on-chain revert would.
pub struct InMemoryContract {
    admin: Address,
    gas_price: u64,
    inner: RwLock<ContractState>,
}

#[derive(Default)]
struct ContractState {
    courses: BTreeMap<String, CourseState>,
    nonces: HashMap<Address, u64>,
    receipts: HashMap<TxHash, Receipt>,
    block_number: u64,
}

struct CourseState {
    seats: u32,
    prerequisites: Vec<String>,
    active: bool,
    enrolled: BTreeSet<Address>,
}

impl InMemoryContract {
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            gas_price: 1,
            inner: RwLock::new(ContractState::default()),
        }
    }

    pub fn with_gas_price(mut self, gas_price: u64) -> Self {
        self.gas_price = gas_price;
        self
    }

    /// Open or close a course. Returns `false` if the course is unknown.
    pub fn set_course_active(&self, name: &str, active: bool) -> Result<bool, LedgerError> {
        let mut state = self.write_state()?;
        Ok(match state.courses.get_mut(name) {
            Some(course) => {
                course.active = active;
                true
            }
            None => false,
        })
    }

    pub fn is_enrolled(&self, name: &str, student: &Address) -> Result<bool, LedgerError> {
        let state = self.read_state()?;
        Ok(state
            .courses
            .get(name)
            .is_some_and(|course| course.enrolled.contains(student)))
    }

    /// Height of the latest mined block.
    pub fn block_number(&self) -> Result<u64, LedgerError> {
        Ok(self.read_state()?.block_number)
    }

    fn read_state(&self) -> Result<std::sync::RwLockReadGuard<'_, ContractState>, LedgerError> {
        self.inner
            .read()
            .map_err(|_| LedgerError::Transport("contract read lock poisoned".into()))
    }

    fn write_state(&self) -> Result<std::sync::RwLockWriteGuard<'_, ContractState>, LedgerError> {
        self.inner
            .write()
            .map_err(|_| LedgerError::Transport("contract write lock poisoned".into()))
    }

    fn execute(&self, state: &mut ContractState, tx: &SignedTransaction) -> Result<(), String> {
        let sender = tx.request.from;
        match &tx.request.action {
            ContractAction::AddCourse {
                name,
                seats,
                prerequisites,
            } => {
                if sender != self.admin {
                    return Err("only the admin may add courses".into());
                }
                if state.courses.contains_key(name) {
                    return Err(format!("course {name} already exists"));
                }
                state.courses.insert(
                    name.clone(),
                    CourseState {
                        seats: *seats,
                        prerequisites: prerequisites.clone(),
                        active: *seats > 0,
                        enrolled: BTreeSet::new(),
                    },
                );
                Ok(())
            }
            ContractAction::Enroll { course_code } => {
                let course = state
                    .courses
                    .get_mut(course_code)
                    .ok_or_else(|| format!("course {course_code} does not exist"))?;
                if !course.active {
                    return Err(format!("course {course_code} is not active"));
                }
                if course.seats == 0 {
                    return Err(format!("course {course_code} is full"));
                }
                if !course.enrolled.insert(sender) {
                    return Err(format!("already enrolled in {course_code}"));
                }
                course.seats -= 1;
                if course.seats == 0 {
                    course.active = false;
                }
                Ok(())
            }
        }
    }
}

fn gas_cost(action: &ContractAction) -> u64 {
    BASE_GAS
        + match action {
            ContractAction::Enroll { .. } => ENROLL_GAS,
            ContractAction::AddCourse { prerequisites, .. } => {
                ADD_COURSE_GAS + PREREQUISITE_GAS * prerequisites.len() as u64
            }
        }
}

#[async_trait]
impl ContractTransport for InMemoryContract {
    async fn course_details(&self, code: &str) -> Result<Option<LedgerCourseView>, LedgerError> {
        let state = self.read_state()?;
        Ok(state.courses.get(code).map(|course| LedgerCourseView {
            name: code.to_string(),
            available_seats: course.seats,
            prerequisites: course.prerequisites.clone(),
            is_active: course.active,
        }))
    }

    async fn transaction_count(&self, address: &Address) -> Result<u64, LedgerError> {
        let state = self.read_state()?;
        Ok(state.nonces.get(address).copied().unwrap_or(0))
    }

    async fn gas_price(&self) -> Result<u64, LedgerError> {
        Ok(self.gas_price)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> Result<TxHash, LedgerError> {
        let tx = SignedTransaction::decode(raw)?;
        tx.verify()?;
        let tx_hash = tx.hash()?;

        let mut state = self.write_state()?;
        let expected = state.nonces.get(&tx.request.from).copied().unwrap_or(0);
        if tx.request.nonce != expected {
            return Err(LedgerError::NonceMismatch {
                expected,
                found: tx.request.nonce,
            });
        }
        if tx.request.gas_price < self.gas_price {
            return Err(LedgerError::rejected(format!(
                "gas price {} below network price {}",
                tx.request.gas_price, self.gas_price
            )));
        }

        state.nonces.insert(tx.request.from, expected + 1);
        state.block_number += 1;

        let required = gas_cost(&tx.request.action);
        let (status, gas_used) = if required > tx.request.gas_limit {
            debug!(tx = %tx_hash, required, "transaction ran out of gas");
            (ReceiptStatus::Failure, tx.request.gas_limit)
        } else {
            match self.execute(&mut state, &tx) {
                Ok(()) => (ReceiptStatus::Success, required),
                Err(reason) => {
                    debug!(tx = %tx_hash, %reason, "transaction reverted");
                    (ReceiptStatus::Failure, required)
                }
            }
        };

        let receipt = Receipt {
            status,
            tx_hash: tx_hash.clone(),
            block_number: state.block_number,
            gas_used,
        };
        state.receipts.insert(tx_hash.clone(), receipt);
        Ok(tx_hash)
    }

    async fn transaction_receipt(&self, tx_hash: &TxHash) -> Result<Option<Receipt>, LedgerError> {
        let state = self.read_state()?;
        Ok(state.receipts.get(tx_hash).cloned())
    }
}
