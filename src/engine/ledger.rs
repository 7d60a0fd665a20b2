//! Transfer ledger — applies accepted transfers to persisted team state.
//!
//! The caller may accept any subset of a recommendation's moves. The
//! ledger recomputes the bank under the resale rule, maintains purchase
//! records, and resets the free-transfer count. It never mutates the
//! input state: on any failure the previous state is all that exists.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info};

use crate::strategy::valuation::sell_price_tenths;
use crate::types::{find_player, GafferError, Player, TeamState};

/// Apply accepted transfers and return the successor state.
///
/// When `accepted_outs` is empty and `accepted_ins` is not, outs are
/// inferred from the held players sorted by (position, price, id)
/// ascending — a fixed cheapest-first rule, deliberately not a second
/// optimization pass.
pub fn apply_transfers(
    state: &TeamState,
    pool: &[Player],
    accepted_ins: &[u32],
    accepted_outs: &[u32],
) -> Result<TeamState, GafferError> {
    state.validate()?;

    // Every purchase needs a current quote.
    for id in accepted_ins {
        if find_player(pool, *id).is_none() {
            return Err(GafferError::Resolution(id.to_string()));
        }
    }

    let held: BTreeSet<u32> = state.player_ids.iter().copied().collect();
    let ins: BTreeSet<u32> = accepted_ins.iter().copied().collect();

    let outs: Vec<u32> = if accepted_outs.is_empty() && !accepted_ins.is_empty() {
        infer_outs(state, pool, &ins, accepted_ins.len())
    } else {
        accepted_outs.to_vec()
    };

    let mut new_ids: BTreeSet<u32> = held.clone();
    for id in &outs {
        new_ids.remove(id);
    }
    new_ids.extend(ins.iter().copied());
    if new_ids.len() != 15 {
        return Err(GafferError::InvalidTransferSet { got: new_ids.len() });
    }

    // Cash flow under the resale rule. A sold player without a current
    // quote sells at his purchase price.
    let raised: i64 = outs
        .iter()
        .map(|id| {
            let now = find_player(pool, *id).map(|i| pool[i].price_tenths);
            let buy = state
                .purchases_tenths
                .get(id)
                .copied()
                .or(now)
                .unwrap_or(0);
            sell_price_tenths(buy, now.unwrap_or(buy))
        })
        .sum();
    let spent: i64 = ins
        .iter()
        .filter_map(|id| find_player(pool, *id).map(|i| pool[i].price_tenths))
        .sum();
    let new_bank = state.bank_tenths + raised - spent;
    if new_bank < 0 {
        return Err(GafferError::InsufficientFunds {
            shortfall_tenths: -new_bank,
        });
    }

    // Purchase records: keep entries for kept players, add the new buys
    // at today's price, drop the sold.
    let mut purchases: BTreeMap<u32, i64> = state
        .purchases_tenths
        .iter()
        .filter(|(id, _)| new_ids.contains(id))
        .map(|(id, price)| (*id, *price))
        .collect();
    for id in &ins {
        if let Some(i) = find_player(pool, *id) {
            purchases.insert(*id, pool[i].price_tenths);
        }
    }

    let next = TeamState::new(new_ids.into_iter().collect(), new_bank, 1, purchases);
    debug_assert!(next.validate().is_ok());

    info!(
        ins = ?accepted_ins,
        outs = ?outs,
        bank = next.bank_tenths,
        "Transfers applied"
    );

    Ok(next)
}

/// Cheapest-first outs inference over the held players present in the
/// pool, skipping anyone the caller is buying.
fn infer_outs(state: &TeamState, pool: &[Player], ins: &BTreeSet<u32>, want: usize) -> Vec<u32> {
    let mut held: Vec<&Player> = state
        .player_ids
        .iter()
        .filter_map(|id| find_player(pool, *id).map(|i| &pool[i]))
        .collect();
    held.sort_by(|a, b| {
        a.position
            .cmp(&b.position)
            .then(a.price_tenths.cmp(&b.price_tenths))
            .then(a.id.cmp(&b.id))
    });
    let outs: Vec<u32> = held
        .iter()
        .filter(|p| !ins.contains(&p.id))
        .take(want)
        .map(|p| p.id)
        .collect();
    debug!(?outs, "Inferred outs (cheapest first)");
    outs
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
