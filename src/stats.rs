use crate::error::{MacroError, MacroResult};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{EnumCount, IntoEnumIterator};
use strum_macros::{Display, EnumCount as EnumCountMacro, EnumIter, EnumString};

/// Every character stat the damage model reads, in canonical index order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    EnumString,
    EnumCountMacro,
    Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatKind {
    Atk,
    Def,
    Pwr,
    Str,
    Int,
    Res,
    CritRate,
    CritDmg,
    BossDmg,
    Acc,
    Dodge,
    StatusRes,
    Naegong,
    Hp,
    AtkSpd,
    PotHeal,
    Luk,
    Exp,
}

impl StatKind {
    pub fn from_index(index: usize) -> MacroResult<Self> {
        Self::iter()
            .nth(index)
            .ok_or(MacroError::NoSuchStatIndex(index))
    }

    pub fn from_name(name: &str) -> MacroResult<Self> {
        Self::from_str(name).map_err(|_| MacroError::NoSuchStat(name.to_string()))
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Inclusive `(min, max)` a configured stat may take.
    pub fn range(self) -> (f64, f64) {
        match self {
            Self::Atk | Self::Def | Self::Str | Self::Int | Self::Res | Self::Hp => {
                (1.0, 10_000.0)
            }
            Self::AtkSpd => (0.0, 50.0),
            _ => (0.0, 10_000.0),
        }
    }

    pub fn in_range(self, value: f64) -> bool {
        let (lo, hi) = self.range();
        lo <= value && value <= hi
    }
}

/// Character stats. Plain `Copy` data: simulation mutates local copies only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE", default)]
pub struct Stats {
    pub atk: f64,
    pub def: f64,
    pub pwr: f64,
    #[serde(rename = "STR")]
    pub strength: f64,
    #[serde(rename = "INT")]
    pub intellect: f64,
    pub res: f64,
    pub crit_rate: f64,
    pub crit_dmg: f64,
    pub boss_dmg: f64,
    pub acc: f64,
    pub dodge: f64,
    pub status_res: f64,
    pub naegong: f64,
    pub hp: f64,
    pub atk_spd: f64,
    pub pot_heal: f64,
    pub luk: f64,
    pub exp: f64,
}

impl Default for Stats {
    fn default() -> Self {
        Self {
            atk: 100.0,
            def: 100.0,
            pwr: 100.0,
            strength: 100.0,
            intellect: 100.0,
            res: 10.0,
            crit_rate: 50.0,
            crit_dmg: 50.0,
            boss_dmg: 20.0,
            acc: 10.0,
            dodge: 10.0,
            status_res: 10.0,
            naegong: 10.0,
            hp: 2000.0,
            atk_spd: 15.0,
            pot_heal: 10.0,
            luk: 10.0,
            exp: 10.0,
        }
    }
}

impl Stats {
    pub fn get(&self, kind: StatKind) -> f64 {
        match kind {
            StatKind::Atk => self.atk,
            StatKind::Def => self.def,
            StatKind::Pwr => self.pwr,
            StatKind::Str => self.strength,
            StatKind::Int => self.intellect,
            StatKind::Res => self.res,
            StatKind::CritRate => self.crit_rate,
            StatKind::CritDmg => self.crit_dmg,
            StatKind::BossDmg => self.boss_dmg,
            StatKind::Acc => self.acc,
            StatKind::Dodge => self.dodge,
            StatKind::StatusRes => self.status_res,
            StatKind::Naegong => self.naegong,
            StatKind::Hp => self.hp,
            StatKind::AtkSpd => self.atk_spd,
            StatKind::PotHeal => self.pot_heal,
            StatKind::Luk => self.luk,
            StatKind::Exp => self.exp,
        }
    }

    fn slot_mut(&mut self, kind: StatKind) -> &mut f64 {
        match kind {
            StatKind::Atk => &mut self.atk,
            StatKind::Def => &mut self.def,
            StatKind::Pwr => &mut self.pwr,
            StatKind::Str => &mut self.strength,
            StatKind::Int => &mut self.intellect,
            StatKind::Res => &mut self.res,
            StatKind::CritRate => &mut self.crit_rate,
            StatKind::CritDmg => &mut self.crit_dmg,
            StatKind::BossDmg => &mut self.boss_dmg,
            StatKind::Acc => &mut self.acc,
            StatKind::Dodge => &mut self.dodge,
            StatKind::StatusRes => &mut self.status_res,
            StatKind::Naegong => &mut self.naegong,
            StatKind::Hp => &mut self.hp,
            StatKind::AtkSpd => &mut self.atk_spd,
            StatKind::PotHeal => &mut self.pot_heal,
            StatKind::Luk => &mut self.luk,
            StatKind::Exp => &mut self.exp,
        }
    }

    /// Naegong is an integer stat; fractional writes are truncated.
    pub fn set(&mut self, kind: StatKind, value: f64) {
        let value = if kind == StatKind::Naegong {
            value.trunc()
        } else {
            value
        };
        *self.slot_mut(kind) = value;
    }

    pub fn add(&mut self, kind: StatKind, delta: f64) {
        self.set(kind, self.get(kind) + delta);
    }

    pub fn get_by_name(&self, name: &str) -> MacroResult<f64> {
        Ok(self.get(StatKind::from_name(name)?))
    }

    pub fn set_by_name(&mut self, name: &str, value: f64) -> MacroResult<()> {
        self.set(StatKind::from_name(name)?, value);
        Ok(())
    }

    pub fn get_by_index(&self, index: usize) -> MacroResult<f64> {
        Ok(self.get(StatKind::from_index(index)?))
    }

    pub fn set_by_index(&mut self, index: usize, value: f64) -> MacroResult<()> {
        self.set(StatKind::from_index(index)?, value);
        Ok(())
    }

    /// Names of stats currently outside their valid range.
    pub fn out_of_range(&self) -> Vec<StatKind> {
        StatKind::iter()
            .filter(|&k| !k.in_range(self.get(k)))
            .collect()
    }

    /// Bit-exact fingerprint, usable as a hash key.
    pub fn to_bits(&self) -> [u64; StatKind::COUNT] {
        let mut out = [0u64; StatKind::COUNT];
        for kind in StatKind::iter() {
            out[kind.index()] = self.get(kind).to_bits();
        }
        out
    }
}
