// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Tracing runtime control.

use ordermap::OrderMap;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, OnceLock};
#[allow(unused)]
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, Registry, filter::LevelFilter, prelude::*, reload};

use crate::targets::DECLARED_TARGETS;
use crate::trace_target;

trace_target!("tracectl", LevelFilter::INFO, &[]);

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TraceCtlError {
    #[error("Invalid syntax '{0}': expected tag=level")]
    Syntax(String),
    #[error("Invalid level '{0}'")]
    Level(String),
    #[error("Unknown tag '{0}'")]
    UnknownTag(String),
}

#[derive(Debug, Clone)]
pub struct TargetCfg {
    pub(crate) target: &'static str,
    pub(crate) name: &'static str,
    pub(crate) level: LevelFilter,
    pub(crate) tags: Vec<&'static str>,
}
impl TargetCfg {
    #[must_use]
    pub fn target(&self) -> &'static str {
        self.target
    }
    #[must_use]
    pub fn level(&self) -> LevelFilter {
        self.level
    }
    fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(&tag)
    }
}

#[derive(Debug)]
pub(crate) struct TargetCfgDb {
    pub(crate) level: LevelFilter,
    pub(crate) targets: OrderMap<&'static str, TargetCfg>,
}

impl TargetCfgDb {
    fn new(level: LevelFilter) -> Self {
        let mut targets = OrderMap::new();
        for decl in DECLARED_TARGETS {
            // the name is always usable as a tag
            let mut tags = decl.tags.to_vec();
            if !tags.contains(&decl.name) {
                tags.push(decl.name);
            }
            let cfg = TargetCfg {
                target: decl.target,
                name: decl.name,
                level: decl.level,
                tags,
            };
            if let Some(dup) = targets.insert(decl.target, cfg) {
                warn!("Target {} declared more than once", dup.target);
            }
        }
        Self { level, targets }
    }
    fn env_filter(&self) -> EnvFilter {
        let mut filter = EnvFilter::new(self.level.to_string());
        for cfg in self.targets.values() {
            if let Ok(directive) = format!("{}={}", cfg.target, cfg.level).parse() {
                filter = filter.add_directive(directive);
            }
        }
        filter
    }
    pub(crate) fn as_config_string(&self) -> String {
        let mut out = format!("default={}", self.level);
        for cfg in self.targets.values() {
            out += format!(",{}={}", cfg.name, cfg.level).as_str();
        }
        out
    }
}

#[derive(Debug)]
pub struct TracingControl {
    db: Mutex<TargetCfgDb>,
    reload_filter: reload::Handle<EnvFilter, Registry>,
}

impl TracingControl {
    fn new() -> Self {
        let db = TargetCfgDb::new(LevelFilter::INFO);
        let (filter, reload_filter) = reload::Layer::new(db.env_filter());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_line_number(true)
            .with_target(true)
            .with_thread_names(false)
            .with_level(true);

        // tests may have installed a subscriber already
        if tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init()
            .is_err()
        {
            eprintln!("A global tracing subscriber was already installed");
        }

        Self {
            db: Mutex::new(db),
            reload_filter,
        }
    }
    fn lock(&self) -> MutexGuard<'_, TargetCfgDb> {
        self.db
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
    fn reload(&self, db: &TargetCfgDb) {
        if let Err(e) = self.reload_filter.reload(db.env_filter()) {
            error!("Failed to reload tracing filter: {e}");
        }
    }

    pub fn set_default_level(&self, level: LevelFilter) {
        let mut db = self.lock();
        if db.level != level {
            db.level = level;
            self.reload(&db);
        }
    }
    #[must_use]
    pub fn get_default_level(&self) -> LevelFilter {
        self.lock().level
    }
    pub fn set_level_all(&self, level: LevelFilter) {
        let mut db = self.lock();
        for cfg in db.targets.values_mut() {
            cfg.level = level;
        }
        self.reload(&db);
    }

    /// Set the level of all targets carrying `tag`. Returns the number of targets changed.
    pub fn set_tag_level(&self, tag: &str, level: LevelFilter) -> Result<usize, TraceCtlError> {
        let mut db = self.lock();
        let mut found = false;
        let mut changed = 0;
        for cfg in db.targets.values_mut().filter(|cfg| cfg.has_tag(tag)) {
            found = true;
            if cfg.level != level {
                cfg.level = level;
                changed += 1;
            }
        }
        if !found {
            return Err(TraceCtlError::UnknownTag(tag.to_string()));
        }
        if changed > 0 {
            self.reload(&db);
        }
        debug!("Log level for tag '{tag}' set to {level}. Targets changed: {changed}");
        Ok(changed)
    }

    /// Parse a string made of comma-separated tag=level, where level=off,error,warn,info,debug,trace
    fn parse_tracing_config(input: &str) -> Result<OrderMap<String, LevelFilter>, TraceCtlError> {
        let mut result = OrderMap::new();
        for item in input.split(',').map(str::trim) {
            let Some((tag, level)) = item.split_once('=') else {
                return Err(TraceCtlError::Syntax(item.to_string()));
            };
            let level = LevelFilter::from_str(level.trim())
                .map_err(|_| TraceCtlError::Level(level.trim().to_string()))?;
            result.insert(tag.trim().to_string(), level);
        }
        Ok(result)
    }

    /// Configure levels from a string like `default=warn,all=info,scheduler=debug`.
    /// `default` sets the level of undeclared targets, `all` that of every declared one and any
    /// other key is a tag. The whole string is checked before anything is applied.
    pub fn setup_from_string(&self, input: &str) -> Result<(), TraceCtlError> {
        let config = Self::parse_tracing_config(input)?;
        {
            let db = self.lock();
            for tag in config.keys().filter(|k| !matches!(k.as_str(), "default" | "all")) {
                if !db.targets.values().any(|cfg| cfg.has_tag(tag)) {
                    return Err(TraceCtlError::UnknownTag(tag.clone()));
                }
            }
        }
        if let Some(level) = config.get("default") {
            self.set_default_level(*level);
        }
        if let Some(level) = config.get("all") {
            self.set_level_all(*level);
        }
        for (tag, level) in config
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), "default" | "all"))
        {
            self.set_tag_level(tag, *level)?;
        }
        Ok(())
    }

    #[must_use]
    pub fn get_target(&self, target: &str) -> Option<TargetCfg> {
        self.lock().targets.get(target).cloned()
    }
    #[must_use]
    pub fn get_targets_by_tag(&self, tag: &str) -> Vec<TargetCfg> {
        self.lock()
            .targets
            .values()
            .filter(|cfg| cfg.has_tag(tag))
            .cloned()
            .collect()
    }
    #[must_use]
    pub fn as_config_string(&self) -> String {
        self.lock().as_config_string()
    }
    pub fn dump(&self) {
        let db = self.lock();
        info!("{db}");
    }
}

static TRACING_CTL: OnceLock<TracingControl> = OnceLock::new();

/// Get a reference to the process-wide [`TracingControl`], installing the subscriber if needed
pub fn get_trace_ctl() -> &'static TracingControl {
    TRACING_CTL.get_or_init(TracingControl::new)
}

#[cfg(test)]
mod tests {
    use crate::control::{TraceCtlError, TracingControl, get_trace_ctl};
    use crate::targets::DECLARED_TARGETS;
    use crate::{LevelFilter, custom_target};
    use serial_test::serial;

    const TAG: &str = "common-tag";
    custom_target!("t1", LevelFilter::DEBUG, &[TAG]);
    custom_target!("t2", LevelFilter::ERROR, &[TAG]);
    custom_target!("t3", LevelFilter::WARN, &[]);

    #[test]
    fn targets_are_collected_at_link_time() {
        let declared: Vec<&str> = DECLARED_TARGETS.iter().map(|d| d.target).collect();
        assert!(declared.contains(&"t1"));
        assert!(declared.contains(&"t2"));
        assert!(declared.contains(&"t3"));
        // the module-level declaration of the control module itself
        assert!(declared.contains(&"nfbench_tracectl::control"));
    }

    #[test]
    #[serial]
    fn tag_level_applies_to_all_tagged_targets() {
        let tctl = get_trace_ctl();
        tctl.set_tag_level(TAG, LevelFilter::OFF).unwrap();
        for cfg in tctl.get_targets_by_tag(TAG) {
            assert_eq!(cfg.level(), LevelFilter::OFF);
        }
        assert_eq!(tctl.get_targets_by_tag(TAG).len(), 2);
        assert_eq!(
            tctl.set_tag_level("no-such-tag", LevelFilter::INFO),
            Err(TraceCtlError::UnknownTag("no-such-tag".to_string()))
        );
    }

    #[test]
    #[serial]
    fn setup_from_string() {
        let tctl = get_trace_ctl();
        tctl.setup_from_string("default=warn, common-tag=info, t3=trace")
            .unwrap();
        assert_eq!(tctl.get_default_level(), LevelFilter::WARN);
        assert_eq!(tctl.get_target("t1").unwrap().level(), LevelFilter::INFO);
        assert_eq!(tctl.get_target("t2").unwrap().level(), LevelFilter::INFO);
        assert_eq!(tctl.get_target("t3").unwrap().level(), LevelFilter::TRACE);
        assert!(tctl.as_config_string().starts_with("default=warn"));

        // nothing is applied if any item is wrong
        assert!(matches!(
            tctl.setup_from_string("t3=off,t1=bad"),
            Err(TraceCtlError::Level(_))
        ));
        assert!(matches!(
            tctl.setup_from_string("t3=off, foo"),
            Err(TraceCtlError::Syntax(_))
        ));
        assert!(matches!(
            tctl.setup_from_string("t3=off,nope=info"),
            Err(TraceCtlError::UnknownTag(_))
        ));
        assert_eq!(tctl.get_target("t3").unwrap().level(), LevelFilter::TRACE);
    }

    #[test]
    #[serial]
    fn all_overrides_every_target() {
        let tctl = get_trace_ctl();
        tctl.setup_from_string("all=error,t1=debug").unwrap();
        assert_eq!(tctl.get_target("t1").unwrap().level(), LevelFilter::DEBUG);
        assert_eq!(tctl.get_target("t2").unwrap().level(), LevelFilter::ERROR);
        assert_eq!(tctl.get_target("t3").unwrap().level(), LevelFilter::ERROR);
        let _ = TracingControl::parse_tracing_config("a=info").unwrap();
    }
}
