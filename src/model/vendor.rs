use crate::model::{
    events::codes,
    game::{Player, VendorCounters},
    regression::CoefficientModel,
    structures::{game_type::GameType, statistic::Statistic, system::System}
};

/// The handful of behaviors that genuinely differ between hardware vendors.
pub trait VendorProfile: Send + Sync {
    fn system(&self) -> System;

    /// Number of bonus actions (power-ups, missiles...) that feed the skill bonus.
    fn bonus_count(&self, player: &Player) -> u32;

    /// Linear `[bias, enemies, teammates, length]` coefficients used when no
    /// regression baseline can be fitted.
    fn fallback_coefficients(&self, statistic: Statistic) -> [f64; 4];

    /// Vendor event codes the hardware emits.
    fn event_codes(&self) -> &'static [&'static str];

    fn fallback_baseline(&self, statistic: Statistic, game_type: GameType) -> CoefficientModel {
        if statistic.is_own_team() && !game_type.is_team() {
            return CoefficientModel::constant(0.0);
        }

        CoefficientModel::linear(self.fallback_coefficients(statistic).to_vec())
    }
}

pub struct LaserMaxxProfile {
    system: System
}

pub struct LaserForceProfile;

static EVO5: LaserMaxxProfile = LaserMaxxProfile { system: System::Evo5 };
static EVO6: LaserMaxxProfile = LaserMaxxProfile { system: System::Evo6 };
static LASERFORCE: LaserForceProfile = LaserForceProfile;

pub fn profile(system: System) -> &'static dyn VendorProfile {
    match system {
        System::Evo5 => &EVO5,
        System::Evo6 => &EVO6,
        System::LaserForce => &LASERFORCE
    }
}

impl VendorProfile for LaserMaxxProfile {
    fn system(&self) -> System {
        self.system
    }

    fn bonus_count(&self, player: &Player) -> u32 {
        player.counters.lasermaxx().map(|c| c.power_ups()).unwrap_or(0)
    }

    fn event_codes(&self) -> &'static [&'static str] {
        match self.system {
            System::Evo6 => &[codes::MINE_HIT, codes::PENALTY, codes::BASE_DESTROYED, codes::BALL_GOAL],
            _ => &[codes::MINE_HIT, codes::BASE_DESTROYED, codes::BALL_GOAL]
        }
    }

    // Fitted on the pooled LaserMaxx history before per-arena baselines existed
    fn fallback_coefficients(&self, statistic: Statistic) -> [f64; 4] {
        match statistic {
            Statistic::Hits => [4.0, 2.730673, 0.893279, 1.6],
            Statistic::Deaths => [3.5, 2.512411, 0.751236, 1.5],
            Statistic::HitsOwn => [0.2, 0.053301, 0.451129, 0.08],
            Statistic::DeathsOwn => [0.2, 0.081772, 0.402318, 0.08]
        }
    }
}

impl VendorProfile for LaserForceProfile {
    fn system(&self) -> System {
        System::LaserForce
    }

    fn bonus_count(&self, player: &Player) -> u32 {
        match &player.counters {
            VendorCounters::LaserForce(c) => c.missiles + c.nukes,
            _ => 0
        }
    }

    fn event_codes(&self) -> &'static [&'static str] {
        &[codes::MISSILE, codes::NUKE, codes::BASE_DESTROYED]
    }

    fn fallback_coefficients(&self, statistic: Statistic) -> [f64; 4] {
        match statistic {
            Statistic::Hits => [2.0, 3.214518, 0.602113, 1.9],
            Statistic::Deaths => [2.5, 2.905531, 0.498761, 1.7],
            Statistic::HitsOwn => [0.1, 0.031142, 0.302284, 0.05],
            Statistic::DeathsOwn => [0.1, 0.030019, 0.298874, 0.05]
        }
    }
}
