//! Demand model: derives population, visitor demand, jobs and mail demand
//! from a descriptor and the world's per-level multipliers, plus the
//! month-scaled "adjusted" variants.

use serde::{Deserialize, Serialize};

use crate::config::{CAPACITY_UNSPECIFIED, RESIDENTIAL_VISITOR_DIVISOR};
use crate::structure_catalog::{BuildingDesc, BuildingType, FactorySector};
use crate::structure_params::StructureParams;

/// Raw and adjusted demand figures held by one structure.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    bitcode::Encode,
    bitcode::Decode,
)]
pub struct DemandFigures {
    pub population: u16,
    pub visitor_demand: u16,
    pub jobs: u16,
    pub mail_demand: u16,
    pub adjusted_population: u16,
    pub adjusted_visitor_demand: u16,
    pub adjusted_jobs: u16,
    pub adjusted_mail_demand: u16,
    /// Factory visitor demand waits for the factory sector to be known.
    pub visitor_demand_pending: bool,
}

/// Capacity from an explicit descriptor value, or `level * per_level` when
/// the value is the "unspecified" sentinel.
pub fn derive_capacity(explicit: u16, level: u16, per_level: u16) -> u16 {
    if explicit == CAPACITY_UNSPECIFIED {
        clamp_u16(u32::from(level) * u32::from(per_level))
    } else {
        explicit
    }
}

/// Month-scaled figure; a positive raw value never adjusts to zero.
pub fn adjust(params: &StructureParams, raw: u16) -> u16 {
    if raw == 0 {
        return 0;
    }
    let adjusted = params.calc_adjusted_monthly_figure(i64::from(raw));
    clamp_u16(adjusted.max(1))
}

/// Residential visitor demand: one twentieth of population, at least one
/// while anyone lives there.
pub fn residential_visitor_demand(population: u16) -> u16 {
    if population == 0 {
        0
    } else {
        (population / RESIDENTIAL_VISITOR_DIVISOR).max(1)
    }
}

/// All demand figures for a freshly placed or re-derived structure.
pub fn derive_figures(desc: &BuildingDesc, params: &StructureParams) -> DemandFigures {
    let mut figures = DemandFigures::default();
    let people_capacity = desc.population_and_visitor_demand_capacity;

    match desc.building_type {
        BuildingType::Residential => {
            figures.population =
                derive_capacity(people_capacity, desc.level, params.population_per_level);
            figures.adjusted_population = adjust(params, figures.population);
        }
        BuildingType::Industrial => {}
        BuildingType::Factory if people_capacity == CAPACITY_UNSPECIFIED => {
            figures.visitor_demand_pending = true;
        }
        _ => {
            figures.visitor_demand =
                derive_capacity(people_capacity, desc.level, params.visitor_demand_per_level);
            figures.adjusted_visitor_demand = adjust(params, figures.visitor_demand);
        }
    }

    let no_derived_work = matches!(
        desc.building_type,
        BuildingType::Residential | BuildingType::Monument
    );
    figures.jobs = if no_derived_work && desc.employment_capacity == CAPACITY_UNSPECIFIED {
        0
    } else {
        derive_capacity(desc.employment_capacity, desc.level, params.jobs_per_level)
    };
    figures.mail_demand =
        if no_derived_work && desc.mail_demand_and_production_capacity == CAPACITY_UNSPECIFIED {
            0
        } else {
            derive_capacity(
                desc.mail_demand_and_production_capacity,
                desc.level,
                params.mail_per_level,
            )
        };
    figures.adjusted_jobs = adjust(params, figures.jobs);
    figures.adjusted_mail_demand = adjust(params, figures.mail_demand);
    figures
}

/// Settles deferred factory visitor demand once the factory sector is known:
/// end consumers get `level * visitor_demand_per_level`, everyone else none.
pub fn resolve_factory_visitor_demand(
    figures: &mut DemandFigures,
    desc: &BuildingDesc,
    params: &StructureParams,
    sector: FactorySector,
) {
    if !figures.visitor_demand_pending {
        return;
    }
    figures.visitor_demand_pending = false;
    if sector == FactorySector::EndConsumer {
        figures.visitor_demand = clamp_u16(
            u32::from(desc.level) * u32::from(params.visitor_demand_per_level),
        );
        figures.adjusted_visitor_demand = adjust(params, figures.visitor_demand);
    } else {
        figures.visitor_demand = 0;
        figures.adjusted_visitor_demand = 0;
    }
}

/// Share of `total` belonging to `class`, given cumulative proportions.
///
/// `None` asks for all classes combined. A zero proportion sum splits
/// evenly across `classes`; a class beyond the last returns the total.
pub fn class_share(total: u16, cumulative: &[u32], classes: u8, class: Option<u8>) -> u16 {
    let Some(class) = class else {
        return total;
    };
    let sum = cumulative.last().copied().unwrap_or(0);
    if sum == 0 {
        return total / u16::from(classes.max(1));
    }
    if class >= classes {
        return total;
    }
    let at = |i: usize| -> u32 {
        let proportion = cumulative.get(i).copied().unwrap_or(sum);
        u32::from(total) * proportion / sum
    };
    let i = usize::from(class);
    let share = if i == 0 { at(0) } else { at(i) - at(i - 1) };
    clamp_u16(share)
}

fn clamp_u16(v: impl TryInto<u16>) -> u16 {
    v.try_into().unwrap_or(u16::MAX)
}
