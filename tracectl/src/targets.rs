// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Link-time registry of tracing targets declared across the workspace

use crate::LevelFilter;
use linkme::distributed_slice;

/// A tracing target as declared by [`crate::trace_target!`] or [`crate::custom_target!`].
pub struct TargetDecl {
    pub(crate) target: &'static str,
    pub(crate) name: &'static str,
    pub(crate) level: LevelFilter,
    pub(crate) tags: &'static [&'static str],
}
impl TargetDecl {
    #[must_use]
    pub const fn new(
        target: &'static str,
        name: &'static str,
        level: LevelFilter,
        tags: &'static [&'static str],
    ) -> Self {
        Self {
            target,
            name,
            level,
            tags,
        }
    }
}

#[distributed_slice]
pub static DECLARED_TARGETS: [TargetDecl];

#[macro_export]
/// Declare the tracing target of the calling module, with a short name, a default level and tags.
/// The short name is usable as a tag when configuring levels.
macro_rules! trace_target {
    // Each expansion lives in its own const scope so that the static can always be
    // called DECL without clashing at link time.
    ($name:expr, $level:expr, $tags:expr) => {
        const _: () = {
            use $crate::LevelFilter;
            use $crate::targets::{DECLARED_TARGETS, TargetDecl};
            #[linkme::distributed_slice(DECLARED_TARGETS)]
            static DECL: TargetDecl = TargetDecl::new(module_path!(), $name, $level, $tags);
        };
    };
}

#[macro_export]
/// Declare a tracing target that is not a module path, e.g. one of a third-party crate.
macro_rules! custom_target {
    ($target:expr, $level:expr, $tags:expr) => {
        const _: () = {
            use $crate::LevelFilter;
            use $crate::targets::{DECLARED_TARGETS, TargetDecl};
            #[linkme::distributed_slice(DECLARED_TARGETS)]
            static DECL: TargetDecl = TargetDecl::new($target, $target, $level, $tags);
        };
    };
}
