//! Pipeline orchestration: a resumable state machine whose suspension
//! points sit only at stage boundaries.
//!
//! Stages run in a fixed order over one owned `GridModel`; each validates
//! its predecessor state and fails fast on misordered calls. Observers are
//! notified once, synchronously, after entity population.

use crate::connector::RoomConnector;
use crate::error::GenerationError;
use crate::grid::GridModel;
use crate::partition::{BspNode, SpacePartitioner};
use crate::populate::{EntityPopulator, SpawnPoint, SpawnReport};
use crate::render::{self, RenderSettings, RenderStats, VisualFactory};
use crate::room::RoomId;
use crate::settings::{GenerationSettings, SpawnSettings, StartingPointCriteria};
use crate::starting_point::StartingPointSelector;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Where the pipeline currently stands. Generation may be driven stepwise;
/// cancelling between stages means calling `clear` and starting over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Empty,
    Structured,
    StartSelected,
    Progressed,
    Populated,
    Rendered,
}

/// Listener for the spawning-complete notification. Ordering relative to
/// rendering is unspecified; listeners must not depend on it.
pub trait SpawnObserver {
    fn spawning_complete(&mut self, report: SpawnReport);
}

/// Handle for unsubscribing an observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverId(u64);

pub struct Pipeline {
    model: GridModel,
    tree: Option<BspNode>,
    rng: Option<ChaCha8Rng>,
    stage: Stage,
    distances: Vec<Option<u32>>,
    spawns: Vec<SpawnPoint>,
    observers: Vec<(ObserverId, Box<dyn SpawnObserver>)>,
    next_observer: u64,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            model: GridModel::new(1, 1),
            tree: None,
            rng: None,
            stage: Stage::Empty,
            distances: Vec::new(),
            spawns: Vec::new(),
            observers: Vec::new(),
            next_observer: 0,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn model(&self) -> &GridModel {
        &self.model
    }

    pub fn spawns(&self) -> &[SpawnPoint] {
        &self.spawns
    }

    /// The BSP tree behind the current structure, if one has been generated.
    pub fn partition_tree(&self) -> Option<&BspNode> {
        self.tree.as_ref()
    }

    /// Hop distance of each room from the starting room, available once
    /// `setup_initial_progression` has run.
    pub fn room_distances(&self) -> &[Option<u32>] {
        &self.distances
    }

    pub fn subscribe(&mut self, observer: Box<dyn SpawnObserver>) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, observer));
        id
    }

    pub fn unsubscribe(&mut self, id: ObserverId) {
        self.observers.retain(|(oid, _)| *oid != id);
    }

    /// Discard all generated state. Observers stay subscribed.
    pub fn clear(&mut self) {
        self.model = GridModel::new(1, 1);
        self.tree = None;
        self.rng = None;
        self.distances.clear();
        self.spawns.clear();
        self.stage = Stage::Empty;
    }

    /// Partition the grid and connect the rooms. The seed in `settings`
    /// fully determines this stage and all later random draws.
    pub fn generate_structure(
        &mut self,
        settings: &GenerationSettings,
    ) -> Result<(), GenerationError> {
        self.clear();
        let settings = settings.clone().validated();
        log::info!(
            "generating {}x{} dungeon, seed {}",
            settings.width,
            settings.height,
            settings.seed
        );
        let mut rng = ChaCha8Rng::seed_from_u64(settings.seed);
        let mut model = GridModel::new(settings.width, settings.height);
        let tree = SpacePartitioner::partition(&mut model, &settings, &mut rng)?;
        RoomConnector::connect(&mut model, &tree, &settings, &mut rng)?;
        self.model = model;
        self.tree = Some(tree);
        self.rng = Some(rng);
        self.stage = Stage::Structured;
        Ok(())
    }

    pub fn select_starting_point(
        &mut self,
        criteria: &StartingPointCriteria,
    ) -> Result<RoomId, GenerationError> {
        if self.stage != Stage::Structured {
            return Err(GenerationError::StageNotReady {
                stage: "SelectStartingPoint",
                requirement: "a generated structure",
            });
        }
        let criteria = criteria.clone().validated();
        let winner = StartingPointSelector::select(&mut self.model, &criteria)?;
        self.stage = Stage::StartSelected;
        Ok(winner)
    }

    /// Compute room-graph distances from the starting room; the populator
    /// scales spawn density and difficulty from them.
    pub fn setup_initial_progression(&mut self) -> Result<(), GenerationError> {
        if self.stage != Stage::StartSelected {
            return Err(GenerationError::StageNotReady {
                stage: "SetupInitialProgression",
                requirement: "a selected starting room",
            });
        }
        let start = self.model.starting_room.unwrap_or(0);
        self.distances = self.model.room_distances(start);
        self.stage = Stage::Progressed;
        Ok(())
    }

    /// Place spawns and notify observers with the final counts.
    pub fn populate_entities(
        &mut self,
        spawn_settings: &SpawnSettings,
    ) -> Result<SpawnReport, GenerationError> {
        if self.stage != Stage::Progressed {
            return Err(GenerationError::StageNotReady {
                stage: "PopulateEntities",
                requirement: "initial progression data",
            });
        }
        let spawn_settings = spawn_settings.clone().validated();
        let rng = self.rng.as_mut().ok_or(GenerationError::StageNotReady {
            stage: "PopulateEntities",
            requirement: "a generated structure",
        })?;
        let (spawns, report) =
            EntityPopulator::populate(&self.model, &spawn_settings, &self.distances, rng)?;
        self.spawns = spawns;
        self.stage = Stage::Populated;
        for (_, observer) in &mut self.observers {
            observer.spawning_complete(report);
        }
        Ok(report)
    }

    /// Drive the renderer boundary. Render failures are isolated per tile
    /// inside `render` and never fail the pipeline.
    pub fn render(
        &mut self,
        factory: &mut dyn VisualFactory,
        settings: &RenderSettings,
    ) -> Result<RenderStats, GenerationError> {
        if !matches!(self.stage, Stage::Populated | Stage::Rendered) {
            return Err(GenerationError::StageNotReady {
                stage: "Render",
                requirement: "a populated dungeon",
            });
        }
        let stats = render::render_model(&self.model, factory, settings);
        self.stage = Stage::Rendered;
        Ok(stats)
    }

    /// Run every stage in order.
    pub fn generate_complete(
        &mut self,
        settings: &GenerationSettings,
        criteria: &StartingPointCriteria,
        spawn_settings: &SpawnSettings,
    ) -> Result<SpawnReport, GenerationError> {
        self.generate_structure(settings)?;
        self.select_starting_point(criteria)?;
        self.setup_initial_progression()?;
        self.populate_entities(spawn_settings)
    }
}
