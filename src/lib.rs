// Copyright (c)  by Gleb E. Zaslavkiy
//MIT License
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
//! # RustedBladeGrid
//!
//! Spanwise discretization of rotor blades for beam solvers: adaptive selection of structural
//! control sections from sampled property tables, the node/element grid built on them and
//! interpolators that keep the raw tables as the source of truth.
pub mod Utils;
pub mod blade;
