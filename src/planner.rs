//! Single-shot planning pipeline.
//!
//! Instance → encoder → hard constraints + objective → engine → decoder.
//! Each call owns its encoder and model, so independent instances can be
//! planned concurrently.

use crate::constraint::{PbModel, Wcnf};
use crate::decode::{Decoder, HarvestPlan};
use crate::encoding::VarEncoder;
use crate::engine::{Engine, EngineConfig, EngineStatus};
use crate::error::{HarvestError, Result};
use crate::generate::{ContiguityKind, HardConstraintGenerator};
use crate::model::Instance;
use crate::objective::{ObjectiveBuilder, ObjectiveForm};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info, warn};

/// Why no plan was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Infeasibility {
    /// The engine proved that no feasible plan exists.
    Unsatisfiable,
    /// The engine exhausted its budget; feasibility is unknown.
    EngineTimeout,
}

/// Outcome of one planning run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOutcome {
    /// An optimal plan.
    Optimal(HarvestPlan),
    /// No plan could be produced.
    Infeasible(Infeasibility),
}

impl PlanOutcome {
    /// The plan, or the matching [`HarvestError`].
    pub fn into_plan(self) -> Result<HarvestPlan> {
        match self {
            PlanOutcome::Optimal(plan) => Ok(plan),
            PlanOutcome::Infeasible(Infeasibility::Unsatisfiable) => {
                Err(HarvestError::Unsatisfiable)
            }
            PlanOutcome::Infeasible(Infeasibility::EngineTimeout) => {
                Err(HarvestError::EngineTimeout("engine budget exhausted".into()))
            }
        }
    }

    /// The plan, if one was found.
    pub fn plan(&self) -> Option<&HarvestPlan> {
        match self {
            PlanOutcome::Optimal(plan) => Some(plan),
            PlanOutcome::Infeasible(_) => None,
        }
    }
}

/// The full optimization instance of one planning run.
#[derive(Debug, Clone)]
pub struct BuiltModel {
    /// Encoder that produced every problem variable of `model`.
    pub encoder: VarEncoder,
    /// Hard constraints and objective.
    pub model: PbModel,
}

impl BuiltModel {
    /// Weighted CNF of the model. Auxiliary variables start above the
    /// encoder's identifiers.
    pub fn to_wcnf(&self) -> Result<Wcnf> {
        Wcnf::from_model(&self.model, &mut self.model.var_manager())
    }
}

/// Configuration for the planner.
///
/// # Examples
///
/// ```
/// use u_harvest::generate::ContiguityKind;
/// use u_harvest::objective::ObjectiveForm;
/// use u_harvest::planner::PlannerConfig;
///
/// let config = PlannerConfig::default()
///     .with_strategy(ContiguityKind::SpanningTree)
///     .with_objective(ObjectiveForm::LinearSum);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PlannerConfig {
    /// Reserve contiguity encoding.
    pub strategy: ContiguityKind,
    /// Objective representation handed to the engine.
    pub objective: ObjectiveForm,
    /// Engine budget.
    pub engine: EngineConfig,
    /// Whether [`Planner::plan_batch`] plans instances in parallel using rayon.
    pub parallel: bool,
}

impl PlannerConfig {
    pub fn with_strategy(mut self, strategy: ContiguityKind) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_objective(mut self, objective: ObjectiveForm) -> Self {
        self.objective = objective;
        self
    }

    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.engine.validate()
    }
}

/// Plans harvests with a given configuration.
pub struct Planner {
    config: PlannerConfig,
    generator: HardConstraintGenerator,
}

impl Planner {
    /// Creates a planner.
    pub fn new(config: PlannerConfig) -> Self {
        let generator = HardConstraintGenerator::new(config.strategy);
        Self { config, generator }
    }

    /// The active configuration.
    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Builds the constraint model of `instance` without solving it.
    pub fn build_model(&self, instance: &Instance) -> Result<BuiltModel> {
        let encoder = self.generator.encoder_for(instance)?;
        let mut model = PbModel::new(
            format!(
                "harvest-n{}-k{}-amin{}",
                instance.unit_count(),
                instance.period_count(),
                instance.min_reserve_area()
            ),
            encoder.num_vars(),
        );
        model.extend(self.generator.build(instance, &encoder)?);
        model.set_objective(ObjectiveBuilder::new(self.config.objective).build(instance, &encoder)?);

        debug!(
            vars = model.num_vars,
            constraints = model.constraint_count(),
            depth_levels = encoder.depth_levels(),
            "built model"
        );
        Ok(BuiltModel { encoder, model })
    }

    /// Plans `instance` with `engine`.
    pub fn plan<E: Engine + ?Sized>(&self, instance: &Instance, engine: &E) -> Result<PlanOutcome> {
        self.config
            .validate()
            .map_err(HarvestError::InvalidConfig)?;
        let built = self.build_model(instance)?;
        let solution = engine.solve(&built.model, &self.config.engine)?;

        match solution.status {
            EngineStatus::Optimal => {
                let Some(assignment) = solution.assignment else {
                    return Err(HarvestError::Engine(format!(
                        "engine {} reported optimal without an assignment",
                        engine.name()
                    )));
                };
                let plan = Decoder::new(instance, &built.encoder).decode(&assignment)?;
                if let Some(value) = solution.objective_value {
                    if value != plan.total_profit {
                        warn!(
                            engine_value = value,
                            decoded = plan.total_profit,
                            "engine objective differs from decoded profit"
                        );
                    }
                }
                info!(
                    engine = engine.name(),
                    profit = plan.total_profit,
                    reserve = plan.reserve.len(),
                    ms = solution.solve_time_ms,
                    "optimal plan found"
                );
                Ok(PlanOutcome::Optimal(plan))
            }
            EngineStatus::Infeasible => {
                info!(engine = engine.name(), "instance is unsatisfiable");
                Ok(PlanOutcome::Infeasible(Infeasibility::Unsatisfiable))
            }
            EngineStatus::Timeout => {
                warn!(
                    engine = engine.name(),
                    calls = solution.nodes,
                    ms = solution.solve_time_ms,
                    "engine budget exhausted before completion"
                );
                Ok(PlanOutcome::Infeasible(Infeasibility::EngineTimeout))
            }
            EngineStatus::ModelInvalid => Err(HarvestError::InvalidConfig(format!(
                "engine {} rejected the generated model",
                engine.name()
            ))),
        }
    }

    /// Plans independent instances, one result per instance in input order.
    pub fn plan_batch<E: Engine + ?Sized>(
        &self,
        instances: &[Instance],
        engine: &E,
    ) -> Vec<Result<PlanOutcome>> {
        #[cfg(feature = "parallel")]
        if self.config.parallel {
            return instances
                .par_iter()
                .map(|instance| self.plan(instance, engine))
                .collect();
        }
        instances
            .iter()
            .map(|instance| self.plan(instance, engine))
            .collect()
    }
}

impl Default for Planner {
    fn default() -> Self {
        Self::new(PlannerConfig::default())
    }
}
