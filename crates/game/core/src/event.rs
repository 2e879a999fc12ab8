//! Closed set of combat events.
//!
//! Every event kind has exactly one payload variant, so handlers match
//! exhaustively instead of casting. An [`Event`] wraps the payload with the
//! dispatch flags:
//!
//! - `cancelled` is monotonic within one emission: [`Event::cancel`] sets it and
//!   nothing clears it.
//! - `modified` records that some handler rewrote the payload.
//! - `timestamp` is a logical sequence number assigned by the bus.

use strum::{Display, EnumIter, IntoStaticStr};

use crate::state::PlayerId;

/// Event tag, one per [`EventPayload`] variant.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    GameStart,
    GameEnd,
    TurnStart,
    TurnEnd,
    BeforeAttack,
    AfterAttack,
    BeforeDefend,
    DefendAction,
    AfterDefend,
    EvadeAction,
    BeforeEvade,
    AfterEvade,
    AbilityUse,
    Death,
    PerfectGuard,
    FocusAttack,
    StatusEffectApplied,
    StatusEffectRemoved,
    AbilityChainTriggered,
    DeathZone,
}

/// Why a player died.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DeathCause {
    Attack,
    Ability,
    StatusEffect,
    DeathZone,
}

/// Mutable description of an attack about to resolve.
///
/// `BeforeAttack` handlers may redirect `target`, change `damage`, or set the
/// ignore flags.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackIntent {
    pub attacker: PlayerId,
    pub target: PlayerId,
    pub damage: i32,
    pub ignore_defense: bool,
    pub ignore_evade: bool,
}

impl AttackIntent {
    pub fn new(attacker: PlayerId, target: PlayerId, damage: i32) -> Self {
        Self {
            attacker,
            target,
            damage,
            ignore_defense: false,
            ignore_evade: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventPayload {
    GameStart {
        players: u32,
    },
    GameEnd {
        turn: u32,
        winner: Option<PlayerId>,
    },
    TurnStart {
        turn: u32,
    },
    TurnEnd {
        turn: u32,
    },
    BeforeAttack(AttackIntent),
    AfterAttack {
        attacker: PlayerId,
        target: PlayerId,
        damage: i32,
        remaining_hp: i32,
    },
    BeforeDefend {
        player: PlayerId,
    },
    /// A defended player nullified an incoming attack.
    DefendAction {
        defender: PlayerId,
        attacker: PlayerId,
        blocked: i32,
        gauge_consumed: u32,
    },
    /// A Defend declaration succeeded and the gauge was spent.
    AfterDefend {
        player: PlayerId,
        gauge_left: u32,
    },
    EvadeAction {
        player: PlayerId,
        evade_count: u32,
    },
    BeforeEvade {
        defender: PlayerId,
        attacker: PlayerId,
        chance: u32,
    },
    AfterEvade {
        defender: PlayerId,
        attacker: PlayerId,
        chance: u32,
        roll: u32,
        success: bool,
    },
    AbilityUse {
        actor: PlayerId,
        ability_id: String,
        target: Option<PlayerId>,
    },
    Death {
        victim: PlayerId,
        killer: Option<PlayerId>,
        cause: DeathCause,
    },
    PerfectGuard {
        player: PlayerId,
        gauge: u32,
    },
    FocusAttack {
        attacker: PlayerId,
        target: PlayerId,
        streak: u32,
        bonus: i32,
    },
    StatusEffectApplied {
        player: PlayerId,
        effect_id: String,
        stacks: u32,
        duration: i32,
    },
    StatusEffectRemoved {
        player: PlayerId,
        effect_id: String,
    },
    AbilityChainTriggered {
        source: String,
        owner: PlayerId,
        target: Option<PlayerId>,
    },
    DeathZone {
        turn: u32,
        stage: u32,
        damage: i32,
    },
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::GameStart { .. } => EventKind::GameStart,
            Self::GameEnd { .. } => EventKind::GameEnd,
            Self::TurnStart { .. } => EventKind::TurnStart,
            Self::TurnEnd { .. } => EventKind::TurnEnd,
            Self::BeforeAttack(_) => EventKind::BeforeAttack,
            Self::AfterAttack { .. } => EventKind::AfterAttack,
            Self::BeforeDefend { .. } => EventKind::BeforeDefend,
            Self::DefendAction { .. } => EventKind::DefendAction,
            Self::AfterDefend { .. } => EventKind::AfterDefend,
            Self::EvadeAction { .. } => EventKind::EvadeAction,
            Self::BeforeEvade { .. } => EventKind::BeforeEvade,
            Self::AfterEvade { .. } => EventKind::AfterEvade,
            Self::AbilityUse { .. } => EventKind::AbilityUse,
            Self::Death { .. } => EventKind::Death,
            Self::PerfectGuard { .. } => EventKind::PerfectGuard,
            Self::FocusAttack { .. } => EventKind::FocusAttack,
            Self::StatusEffectApplied { .. } => EventKind::StatusEffectApplied,
            Self::StatusEffectRemoved { .. } => EventKind::StatusEffectRemoved,
            Self::AbilityChainTriggered { .. } => EventKind::AbilityChainTriggered,
            Self::DeathZone { .. } => EventKind::DeathZone,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    payload: EventPayload,
    cancelled: bool,
    modified: bool,
    timestamp: u64,
}

impl Event {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            payload,
            cancelled: false,
            modified: false,
            timestamp: 0,
        }
    }

    #[inline]
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    /// Mutable payload access; marks the event as modified.
    pub fn payload_mut(&mut self) -> &mut EventPayload {
        self.modified = true;
        &mut self.payload
    }

    pub fn into_payload(self) -> EventPayload {
        self.payload
    }

    /// Stops dispatch of this emission. Cannot be undone.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    #[inline]
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Assigns the logical timestamp. Called by the bus when dispatch begins.
    pub fn stamp(&mut self, timestamp: u64) {
        self.timestamp = timestamp;
    }

    pub fn attack_intent(&self) -> Option<&AttackIntent> {
        match &self.payload {
            EventPayload::BeforeAttack(intent) => Some(intent),
            _ => None,
        }
    }

    /// Mutable access to a `BeforeAttack` intent; marks the event as modified.
    pub fn attack_intent_mut(&mut self) -> Option<&mut AttackIntent> {
        match &mut self.payload {
            EventPayload::BeforeAttack(intent) => {
                self.modified = true;
                Some(intent)
            }
            _ => None,
        }
    }
}

impl From<EventPayload> for Event {
    fn from(payload: EventPayload) -> Self {
        Self::new(payload)
    }
}
