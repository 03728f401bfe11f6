//! Per-pass state arbitration.

use indexmap::IndexMap;

use super::StateHandle;

/// One `state()` registration seen during a pass.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub name: String,
    pub priority: u32,
    pub handle: StateHandle,
}

/// Picks the active candidate: highest priority, first registration on ties.
///
/// Returns the index into `candidates`, or `None` when there are none.
///
/// ```rust
/// use signal_layers::{pick_active, Candidate, StateHandle, Value};
///
/// let c = |name: &str, priority| Candidate {
///     name: name.to_string(),
///     priority,
///     handle: StateHandle::new(name, Value::Null),
/// };
/// assert_eq!(pick_active(&[c("a", 1), c("b", 2), c("c", 2)]), Some(1));
/// assert_eq!(pick_active(&[]), None);
/// ```
pub fn pick_active(candidates: &[Candidate]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, candidate) in candidates.iter().enumerate() {
        match best {
            Some(b) if candidates[b].priority >= candidate.priority => {}
            _ => best = Some(i),
        }
    }
    best
}

/// The state registrations of one resolution pass.
///
/// Arbitration is a max-accumulator over priorities. A registration is
/// promoted (exposed under its name) only when its priority is positive and
/// strictly greater than every priority promoted before it. Priority `0`
/// registers a candidate that can only surface through [`active`] when no
/// positive registration exists.
///
/// [`active`]: StateLedger::active
#[derive(Debug, Clone, Default)]
pub struct StateLedger {
    candidates: Vec<Candidate>,
    exposed: IndexMap<String, StateHandle>,
    high_water: u32,
}

impl StateLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a registration, returning the handle if it was promoted.
    pub fn register(
        &mut self,
        name: &str,
        priority: u32,
        handle: StateHandle,
    ) -> Option<StateHandle> {
        self.candidates.push(Candidate {
            name: name.to_string(),
            priority,
            handle: handle.clone(),
        });

        if priority > self.high_water {
            tracing::debug!(
                state = name,
                priority,
                previous = self.high_water,
                "promoting state"
            );
            self.high_water = priority;
            self.exposed.insert(name.to_string(), handle.clone());
            Some(handle)
        } else {
            None
        }
    }

    /// The handle promoted under `name` during this pass.
    pub fn exposed(&self, name: &str) -> Option<&StateHandle> {
        self.exposed.get(name)
    }

    /// Iterates promoted handles in promotion order.
    pub fn exposed_handles(&self) -> impl Iterator<Item = (&str, &StateHandle)> {
        self.exposed.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The winning candidate of the pass so far.
    pub fn active(&self) -> Option<&Candidate> {
        pick_active(&self.candidates).map(|i| &self.candidates[i])
    }

    /// Highest promoted priority, `0` when nothing was promoted.
    pub fn priority(&self) -> u32 {
        self.high_water
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::value::Value;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn active_is_first_maximum(priorities in prop::collection::vec(0u32..5, 1..12)) {
            let mut ledger = StateLedger::new();
            for (i, p) in priorities.iter().enumerate() {
                let name = format!("s{}", i);
                ledger.register(&name, *p, StateHandle::new(&name, Value::Null));
            }

            let max = priorities.iter().copied().max().unwrap_or(0);
            let first = priorities.iter().position(|p| *p == max).unwrap_or(0);
            let active = ledger.active().map(|c| c.name.clone());
            prop_assert_eq!(active, Some(format!("s{}", first)));
            prop_assert_eq!(ledger.priority(), max);
        }
    }
}
