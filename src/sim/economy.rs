//! Money, prices and placement limits

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::placement::PlaceError;
use super::projectile::ProjectileKind;
use super::scene::{HouseSize, Kind};
use crate::settings::EconomySettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Economy {
    pub money: u32,
    /// Unit blocks / houses currently placed, per kind
    placed: BTreeMap<Kind, u32>,
    prices: EconomySettings,
}

impl Economy {
    pub fn new(prices: &EconomySettings) -> Self {
        Self {
            money: prices.starting_money,
            placed: BTreeMap::new(),
            prices: prices.clone(),
        }
    }

    /// Price of one unit block (or one house)
    pub fn unit_cost(&self, kind: Kind) -> u32 {
        match kind {
            Kind::Wall => self.prices.wall_cost,
            Kind::Strong => self.prices.strong_cost,
            Kind::House(HouseSize::Two) => self.prices.house2_cost,
            Kind::House(HouseSize::Four) => self.prices.house4_cost,
            Kind::House(HouseSize::Six) => self.prices.house6_cost,
        }
    }

    pub fn ammo_cost(&self, kind: ProjectileKind) -> u32 {
        match kind {
            ProjectileKind::Base => self.prices.base_shot_cost,
            ProjectileKind::Punch => self.prices.punch_shot_cost,
            ProjectileKind::Area => self.prices.area_shot_cost,
        }
    }

    pub fn placed(&self, kind: Kind) -> u32 {
        self.placed.get(&kind).copied().unwrap_or(0)
    }

    /// Placement cap for a kind (only houses are capped)
    pub fn limit(&self, kind: Kind) -> Option<u32> {
        match kind {
            Kind::House(_) => self.prices.house_limit,
            Kind::Wall | Kind::Strong => None,
        }
    }

    /// Total price of `units` objects of `kind`, if the player may buy them
    pub fn quote(&self, kind: Kind, units: u32) -> Result<u32, PlaceError> {
        if let Some(limit) = self.limit(kind) {
            if self.placed(kind).saturating_add(units) > limit {
                return Err(PlaceError::LimitReached);
            }
        }
        let cost = self.unit_cost(kind).saturating_mul(units);
        if cost > self.money {
            return Err(PlaceError::InsufficientFunds);
        }
        Ok(cost)
    }

    /// Deduct the price and count the new objects
    pub fn purchase(&mut self, kind: Kind, units: u32) -> Result<u32, PlaceError> {
        let cost = self.quote(kind, units)?;
        self.money -= cost;
        let count = self.placed.entry(kind).or_insert(0);
        *count = count.saturating_add(units);
        Ok(cost)
    }

    /// Give back money for one removed object
    pub fn refund(&mut self, kind: Kind, amount: u32) {
        self.money = self.money.saturating_add(amount);
        if let Some(count) = self.placed.get_mut(&kind) {
            *count = count.saturating_sub(1);
        }
    }

    /// Pay for a shot; false if the player cannot afford it
    pub fn spend(&mut self, amount: u32) -> bool {
        if amount > self.money {
            return false;
        }
        self.money -= amount;
        true
    }

    pub fn set_money(&mut self, money: u32) {
        self.money = money;
    }
}
