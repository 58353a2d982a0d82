//! Built-in module libraries available to 《…》 imports. Each submodule
//! assembles one `ModuleLibrary`; `registry` collects them under their
//! source-level names.

use std::collections::HashMap;

use crate::core::environment::ModuleLibrary;
use crate::core::value::Value;

mod chunqiu;
mod tianming;
mod zhizhe;

pub fn registry() -> HashMap<String, ModuleLibrary> {
    let mut modules = HashMap::new();
    modules.insert("志者".to_string(), zhizhe::library());
    modules.insert("春秋".to_string(), chunqiu::library());
    modules.insert("天命".to_string(), tianming::library());
    modules
}

/// Look up an argument by its supplied name.
pub(crate) fn named<'a>(args: &'a [(String, Value)], name: &str) -> Option<&'a Value> {
    args.iter().find(|(n, _)| n == name).map(|(_, v)| v)
}
