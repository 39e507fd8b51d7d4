pub mod yamlfix;
