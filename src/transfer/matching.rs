//! Pairs up the two legs of money moved between two of the user's own accounts,
//! so they can be stored as one Firefly transfer instead of a withdrawal plus a deposit.

use std::collections::HashSet;

use crate::credentials::PowensAccountId;
use crate::powens_api::{normalize_iban, PowensTransaction, TransactionType};

/// Transactions fetched for one mapped account
#[derive(Debug, Clone)]
pub struct AccountTransactions {
    pub account_id: PowensAccountId,
    pub iban: Option<String>,
    pub transactions: Vec<PowensTransaction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionRef {
    pub account: usize,
    pub transaction: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InternalTransfer {
    pub debit: TransactionRef,
    pub credit: TransactionRef,
}

/// Ordered from most to least confident
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchStrategy {
    IbanAndValueDatetime,
    IbanAndValueDate,
    TransferAndValueDatetime,
    TransferAndValueDate,
}

const STRATEGIES: [MatchStrategy; 4] = [
    MatchStrategy::IbanAndValueDatetime,
    MatchStrategy::IbanAndValueDate,
    MatchStrategy::TransferAndValueDatetime,
    MatchStrategy::TransferAndValueDate,
];

impl MatchStrategy {
    /// `candidate` already has the opposite value of `origin` and lives in the account
    /// `origin`'s counterparty IBAN points to.
    fn matches(
        self,
        origin_iban: Option<&str>,
        origin: &PowensTransaction,
        candidate: &PowensTransaction,
    ) -> bool {
        match self {
            MatchStrategy::IbanAndValueDatetime => {
                points_back(origin_iban, candidate)
                    && same_some(&origin.vdatetime, &candidate.vdatetime)
            }
            MatchStrategy::IbanAndValueDate => {
                points_back(origin_iban, candidate) && same_some(&origin.vdate, &candidate.vdate)
            }
            MatchStrategy::TransferAndValueDatetime => {
                candidate.type_ == TransactionType::Transfer
                    && same_some(&origin.vdatetime, &candidate.vdatetime)
            }
            MatchStrategy::TransferAndValueDate => {
                candidate.type_ == TransactionType::Transfer
                    && same_some(&origin.vdate, &candidate.vdate)
            }
        }
    }
}

fn points_back(origin_iban: Option<&str>, candidate: &PowensTransaction) -> bool {
    match (origin_iban, candidate.counterparty_iban()) {
        (Some(origin_iban), Some(candidate_counterparty)) => {
            origin_iban == normalize_iban(candidate_counterparty)
        }
        _ => false,
    }
}

fn same_some<T: PartialEq>(lhs: &Option<T>, rhs: &Option<T>) -> bool {
    matches!((lhs, rhs), (Some(lhs), Some(rhs)) if lhs == rhs)
}

/// Find all pairs of transactions that are two legs of the same internal transfer.
/// Every transaction is part of at most one pair.
pub fn find_internal_transfers(accounts: &[AccountTransactions]) -> Vec<InternalTransfer> {
    let ibans: Vec<Option<String>> = accounts
        .iter()
        .map(|account| account.iban.as_deref().map(normalize_iban))
        .collect();
    let mut paired = HashSet::new();
    let mut result = Vec::new();

    for (account_index, account) in accounts.iter().enumerate() {
        for (transaction_index, transaction) in account.transactions.iter().enumerate() {
            let origin = TransactionRef {
                account: account_index,
                transaction: transaction_index,
            };
            if paired.contains(&origin) {
                continue;
            }
            let Some(counterpart) =
                find_counterpart(accounts, &ibans, account_index, transaction, &paired)
            else {
                continue;
            };
            paired.insert(origin);
            paired.insert(counterpart);

            let origin_is_debit = transaction
                .value
                .is_some_and(|value| value.is_sign_negative());
            result.push(if origin_is_debit {
                InternalTransfer {
                    debit: origin,
                    credit: counterpart,
                }
            } else {
                InternalTransfer {
                    debit: counterpart,
                    credit: origin,
                }
            });
        }
    }

    log::debug!("Found {} internal transfers", result.len());
    result
}

fn find_counterpart(
    accounts: &[AccountTransactions],
    ibans: &[Option<String>],
    account_index: usize,
    origin: &PowensTransaction,
    paired: &HashSet<TransactionRef>,
) -> Option<TransactionRef> {
    let value = origin.value.filter(|value| !value.is_zero())?;
    let counterparty_iban = normalize_iban(origin.counterparty_iban()?);
    let related_index = ibans.iter().enumerate().position(|(index, iban)| {
        index != account_index && iban.as_deref() == Some(counterparty_iban.as_str())
    })?;
    let origin_iban = ibans[account_index].as_deref();

    let candidates: Vec<(TransactionRef, &PowensTransaction)> = accounts[related_index]
        .transactions
        .iter()
        .enumerate()
        .map(|(transaction_index, candidate)| {
            (
                TransactionRef {
                    account: related_index,
                    transaction: transaction_index,
                },
                candidate,
            )
        })
        .filter(|(candidate_ref, candidate)| {
            !paired.contains(candidate_ref) && candidate.value == Some(-value)
        })
        .collect();

    STRATEGIES.iter().find_map(|strategy| {
        candidates
            .iter()
            .find(|(_, candidate)| strategy.matches(origin_iban, origin, candidate))
            .map(|(candidate_ref, _)| *candidate_ref)
    })
}

#[cfg(test)]
mod tests {
    use crate::transfer::testutils::{transaction, transfer_leg};

    use super::*;

    const IBAN_1: &str = "FR7600000000000000000000001";
    const IBAN_2: &str = "FR7600000000000000000000002";

    fn accounts(
        first: Vec<PowensTransaction>,
        second: Vec<PowensTransaction>,
    ) -> Vec<AccountTransactions> {
        vec![
            AccountTransactions {
                account_id: PowensAccountId(1),
                iban: Some(IBAN_1.to_string()),
                transactions: first,
            },
            AccountTransactions {
                account_id: PowensAccountId(2),
                iban: Some(IBAN_2.to_string()),
                transactions: second,
            },
        ]
    }

    fn tref(account: usize, transaction: usize) -> TransactionRef {
        TransactionRef {
            account,
            transaction,
        }
    }

    #[test]
    fn pairs_legs_pointing_at_each_other() {
        let accounts = accounts(
            vec![transfer_leg(1, 1, "-100", "2024-01-15", Some(IBAN_2))],
            vec![transfer_leg(2, 2, "100", "2024-01-15", Some(IBAN_1))],
        );
        assert_eq!(
            vec![InternalTransfer {
                debit: tref(0, 0),
                credit: tref(1, 0),
            }],
            find_internal_transfers(&accounts),
        );
    }

    #[test]
    fn credit_found_first_still_reports_debit() {
        let accounts = accounts(
            vec![transfer_leg(1, 1, "100", "2024-01-15", Some(IBAN_2))],
            vec![transfer_leg(2, 2, "-100", "2024-01-15", Some(IBAN_1))],
        );
        assert_eq!(
            vec![InternalTransfer {
                debit: tref(1, 0),
                credit: tref(0, 0),
            }],
            find_internal_transfers(&accounts),
        );
    }

    #[test]
    fn iban_comparison_ignores_grouping_and_case() {
        let accounts = accounts(
            vec![transfer_leg(
                1,
                1,
                "-100",
                "2024-01-15",
                Some("fr76 0000 0000 0000 0000 0000 002"),
            )],
            vec![transfer_leg(2, 2, "100", "2024-01-15", Some(IBAN_1))],
        );
        assert_eq!(1, find_internal_transfers(&accounts).len());
    }

    #[test]
    fn values_must_be_opposite() {
        let accounts = accounts(
            vec![transfer_leg(1, 1, "-100", "2024-01-15", Some(IBAN_2))],
            vec![transfer_leg(2, 2, "99.99", "2024-01-15", Some(IBAN_1))],
        );
        assert!(find_internal_transfers(&accounts).is_empty());
    }

    #[test]
    fn value_dates_must_match() {
        let accounts = accounts(
            vec![transfer_leg(1, 1, "-100", "2024-01-15", Some(IBAN_2))],
            vec![transfer_leg(2, 2, "100", "2024-01-16", Some(IBAN_1))],
        );
        assert!(find_internal_transfers(&accounts).is_empty());
    }

    #[test]
    fn without_counterparty_iban_nothing_is_paired() {
        let accounts = accounts(
            vec![transfer_leg(1, 1, "-100", "2024-01-15", None)],
            vec![transfer_leg(2, 2, "100", "2024-01-15", None)],
        );
        assert!(find_internal_transfers(&accounts).is_empty());
    }

    #[test]
    fn candidate_without_iban_must_be_typed_transfer() {
        // The credit leg doesn't reference the debit account, only the transfer type links them
        let mut credit_card = transaction(2, 2, "100", "2024-01-15");
        let accounts_with_card = accounts(
            vec![transfer_leg(1, 1, "-100", "2024-01-15", Some(IBAN_2))],
            vec![credit_card.clone()],
        );
        assert!(find_internal_transfers(&accounts_with_card).is_empty());

        credit_card.type_ = TransactionType::Transfer;
        let accounts_with_transfer = accounts(
            vec![transfer_leg(1, 1, "-100", "2024-01-15", Some(IBAN_2))],
            vec![credit_card],
        );
        assert_eq!(1, find_internal_transfers(&accounts_with_transfer).len());
    }

    #[test]
    fn datetime_match_is_preferred_over_date_match() {
        let at = |hour| {
            crate::transfer::testutils::date("2024-01-15")
                .and_hms_opt(hour, 0, 0)
                .unwrap()
        };
        let mut debit = transfer_leg(1, 1, "-100", "2024-01-15", Some(IBAN_2));
        debit.vdatetime = Some(at(10));
        let mut same_day = transfer_leg(2, 2, "100", "2024-01-15", Some(IBAN_1));
        same_day.vdatetime = Some(at(8));
        let mut same_time = transfer_leg(3, 2, "100", "2024-01-15", Some(IBAN_1));
        same_time.vdatetime = Some(at(10));

        let accounts = accounts(vec![debit], vec![same_day, same_time]);
        assert_eq!(
            vec![InternalTransfer {
                debit: tref(0, 0),
                credit: tref(1, 1),
            }],
            find_internal_transfers(&accounts),
        );
    }

    #[test]
    fn each_leg_is_paired_at_most_once() {
        let accounts = accounts(
            vec![
                transfer_leg(1, 1, "-100", "2024-01-15", Some(IBAN_2)),
                transfer_leg(2, 1, "-100", "2024-01-15", Some(IBAN_2)),
            ],
            vec![transfer_leg(3, 2, "100", "2024-01-15", Some(IBAN_1))],
        );
        assert_eq!(
            vec![InternalTransfer {
                debit: tref(0, 0),
                credit: tref(1, 0),
            }],
            find_internal_transfers(&accounts),
        );
    }

    #[test]
    fn transfer_to_own_account_is_ignored() {
        let accounts = accounts(
            vec![
                transfer_leg(1, 1, "-100", "2024-01-15", Some(IBAN_1)),
                transfer_leg(2, 1, "100", "2024-01-15", Some(IBAN_1)),
            ],
            vec![],
        );
        assert!(find_internal_transfers(&accounts).is_empty());
    }
}
