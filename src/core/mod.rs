//! Core building blocks: conversion parameters, diagram styling and the
//! layered graph layout. These are internal primitives consumed by the
//! high-level `api` module.
pub mod layout;
pub mod params;
pub mod style;
