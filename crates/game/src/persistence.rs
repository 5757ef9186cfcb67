//! Permanent meta-progression: levels bought in the shop and banked gold.
//!
//! Stored as RON next to the game, the same way settings are. The simulation
//! only talks to the [`MetaStore`] trait so tests can swap in memory storage.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Meta upgrade levels plus banked gold. Survives between runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaUpgrades {
    #[serde(default)]
    pub max_hp: u32,
    #[serde(default)]
    pub damage: u32,
    #[serde(default)]
    pub speed: u32,
    #[serde(default)]
    pub xp_gain: u32,
    #[serde(default)]
    pub gold: u32,
}

/// Shop entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaUpgradeKind {
    MaxHp,
    Damage,
    Speed,
    XpGain,
}

impl MetaUpgradeKind {
    pub const ALL: [MetaUpgradeKind; 4] = [
        MetaUpgradeKind::MaxHp,
        MetaUpgradeKind::Damage,
        MetaUpgradeKind::Speed,
        MetaUpgradeKind::XpGain,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MetaUpgradeKind::MaxHp => "+10 Max HP",
            MetaUpgradeKind::Damage => "+5% Damage",
            MetaUpgradeKind::Speed => "+5% Speed",
            MetaUpgradeKind::XpGain => "+10% XP Gain",
        }
    }

    /// (base cost, cost added per owned level)
    fn pricing(&self) -> (u32, u32) {
        match self {
            MetaUpgradeKind::MaxHp => (50, 25),
            MetaUpgradeKind::Damage => (75, 50),
            MetaUpgradeKind::Speed => (100, 75),
            MetaUpgradeKind::XpGain => (150, 100),
        }
    }
}

impl MetaUpgrades {
    pub fn level(&self, kind: MetaUpgradeKind) -> u32 {
        match kind {
            MetaUpgradeKind::MaxHp => self.max_hp,
            MetaUpgradeKind::Damage => self.damage,
            MetaUpgradeKind::Speed => self.speed,
            MetaUpgradeKind::XpGain => self.xp_gain,
        }
    }

    fn level_mut(&mut self, kind: MetaUpgradeKind) -> &mut u32 {
        match kind {
            MetaUpgradeKind::MaxHp => &mut self.max_hp,
            MetaUpgradeKind::Damage => &mut self.damage,
            MetaUpgradeKind::Speed => &mut self.speed,
            MetaUpgradeKind::XpGain => &mut self.xp_gain,
        }
    }

    /// Price of the next level of `kind`.
    pub fn cost(&self, kind: MetaUpgradeKind) -> u32 {
        let (base, step) = kind.pricing();
        base + self.level(kind) * step
    }

    /// Spend banked gold on one level. Caller is responsible for saving.
    pub fn purchase(&mut self, kind: MetaUpgradeKind) -> Result<u32, ShopError> {
        let cost = self.cost(kind);
        if self.gold < cost {
            return Err(ShopError::InsufficientGold { cost, available: self.gold });
        }
        self.gold -= cost;
        let level = self.level_mut(kind);
        *level += 1;
        Ok(*level)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShopError {
    #[error("upgrade costs {cost} gold but only {available} is banked")]
    InsufficientGold { cost: u32, available: u32 },
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("could not access save file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("save file {path:?} is corrupt: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("could not encode save data: {0}")]
    Encode(#[from] ron::Error),
}

/// Storage for meta progression. `load` runs once at startup; `save` whenever gold or levels change.
pub trait MetaStore {
    fn load(&self) -> Result<MetaUpgrades, PersistenceError>;
    fn save(&self, meta: &MetaUpgrades) -> Result<(), PersistenceError>;
}

/// RON file on disk. A missing file loads as a fresh profile.
#[derive(Debug, Clone)]
pub struct RonMetaStore {
    path: PathBuf,
}

impl RonMetaStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MetaStore for RonMetaStore {
    fn load(&self) -> Result<MetaUpgrades, PersistenceError> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(MetaUpgrades::default()),
            Err(source) => return Err(PersistenceError::Io { path: self.path.clone(), source }),
        };
        ron::from_str(&data).map_err(|source| PersistenceError::Parse { path: self.path.clone(), source })
    }

    fn save(&self, meta: &MetaUpgrades) -> Result<(), PersistenceError> {
        let s = ron::ser::to_string_pretty(meta, ron::ser::PrettyConfig::default())?;
        std::fs::write(&self.path, s).map_err(|source| PersistenceError::Io { path: self.path.clone(), source })
    }
}

/// In-memory store; records how many times it was saved.
#[derive(Debug, Default)]
pub struct MemoryMetaStore {
    data: RefCell<MetaUpgrades>,
    saves: RefCell<u32>,
}

impl MemoryMetaStore {
    pub fn new(initial: MetaUpgrades) -> Self {
        Self { data: RefCell::new(initial), saves: RefCell::new(0) }
    }

    pub fn saved(&self) -> MetaUpgrades {
        *self.data.borrow()
    }

    pub fn save_count(&self) -> u32 {
        *self.saves.borrow()
    }
}

impl MetaStore for MemoryMetaStore {
    fn load(&self) -> Result<MetaUpgrades, PersistenceError> {
        Ok(*self.data.borrow())
    }

    fn save(&self, meta: &MetaUpgrades) -> Result<(), PersistenceError> {
        *self.data.borrow_mut() = *meta;
        *self.saves.borrow_mut() += 1;
        Ok(())
    }
}

impl<T: MetaStore + ?Sized> MetaStore for std::rc::Rc<T> {
    fn load(&self) -> Result<MetaUpgrades, PersistenceError> {
        (**self).load()
    }

    fn save(&self, meta: &MetaUpgrades) -> Result<(), PersistenceError> {
        (**self).save(meta)
    }
}
