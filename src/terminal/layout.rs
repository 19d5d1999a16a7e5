//! Terminal layout: entry points, restrooms and their gender sections

use crate::types::{EntryPointId, Gender, RestroomId, SectionId, TerminalConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A gate or security checkpoint where passenger flow originates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPoint {
    /// Entry point identifier
    pub id: EntryPointId,
    /// Floor the entry point is on
    pub floor: i32,
    /// Planar x coordinate
    pub x: f64,
    /// Planar y coordinate
    pub y: f64,
}

/// A restroom facility with one queue per gender section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restroom {
    /// Restroom identifier
    pub id: RestroomId,
    /// Floor the restroom is on
    pub floor: i32,
    /// Planar x coordinate
    pub x: f64,
    /// Planar y coordinate
    pub y: f64,
    /// Men's section service rate, passengers per second
    pub capacity_m: f64,
    /// Women's section service rate, passengers per second
    pub capacity_f: f64,
}

impl Restroom {
    /// Service rate of one gender section
    pub fn capacity(&self, gender: Gender) -> f64 {
        match gender {
            Gender::Male => self.capacity_m,
            Gender::Female => self.capacity_f,
        }
    }

    /// Combined service rate of both sections
    pub fn total_capacity(&self) -> f64 {
        self.capacity_m + self.capacity_f
    }

    /// Identifier of one gender section
    pub fn section_id(&self, gender: Gender) -> SectionId {
        SectionId::new(self.id.clone(), gender)
    }

    /// Both sections of the restroom, men's first
    pub fn sections(&self) -> Vec<RestroomSection> {
        Gender::ALL
            .iter()
            .map(|&gender| RestroomSection { id: self.section_id(gender), capacity: self.capacity(gender) })
            .collect()
    }
}

/// One gender-specific half of a restroom
#[derive(Debug, Clone, PartialEq)]
pub struct RestroomSection {
    /// Section identifier
    pub id: SectionId,
    /// Service rate, passengers per second
    pub capacity: f64,
}

/// Immutable terminal geometry loaded once from configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalLayout {
    /// Declared floors in ascending order
    pub floors: Vec<i32>,
    /// Entry points by id
    pub entry_points: BTreeMap<EntryPointId, EntryPoint>,
    /// Restrooms by id
    pub restrooms: BTreeMap<RestroomId, Restroom>,
}

impl TerminalLayout {
    /// Build the layout from a terminal configuration
    pub fn from_config(config: &TerminalConfig) -> Self {
        let entry_points = config
            .entry_points
            .iter()
            .map(|(id, spec)| {
                (id.clone(), EntryPoint { id: id.clone(), floor: spec.floor, x: spec.x, y: spec.y })
            })
            .collect();
        let restrooms = config
            .restrooms
            .iter()
            .map(|(id, spec)| {
                let restroom = Restroom {
                    id: id.clone(),
                    floor: spec.floor,
                    x: spec.x,
                    y: spec.y,
                    capacity_m: spec.capacity_m,
                    capacity_f: spec.capacity_f,
                };
                (id.clone(), restroom)
            })
            .collect();

        Self { floors: config.floors.clone(), entry_points, restrooms }
    }

    /// All restroom sections in restroom order, men's before women's
    pub fn sections(&self) -> Vec<RestroomSection> {
        self.restrooms.values().flat_map(Restroom::sections).collect()
    }

    /// Sections serving one gender
    pub fn sections_for(&self, gender: Gender) -> Vec<RestroomSection> {
        self.restrooms
            .values()
            .map(|restroom| RestroomSection {
                id: restroom.section_id(gender),
                capacity: restroom.capacity(gender),
            })
            .collect()
    }

    /// Look up a restroom
    pub fn restroom(&self, id: &RestroomId) -> Option<&Restroom> {
        self.restrooms.get(id)
    }
}
