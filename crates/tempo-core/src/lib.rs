//! # tempo-core
//!
//! Core types shared across all Tempo crates.
//!
//! This crate provides:
//! - Record structs supplied by the external importer (work records,
//!   allocations, projects, milestones, skills)
//! - Category, project-type, severity, and risk enums
//! - `Month` tokens and the `MonthFilter` period resolver
//! - The single-step project hierarchy resolver
//! - The KPI results object and its persisted snapshot envelope
//! - Cross-cutting error types

pub mod entities;
pub mod enums;
pub mod errors;
pub mod hierarchy;
pub mod kpi;
pub mod month;
