//! Form configuration adapters.

mod in_memory_form_config_source;

pub use in_memory_form_config_source::{
    load_form_file, parse_form_yaml, parse_form_yaml_with_limits, InMemoryFormConfigSource,
};
