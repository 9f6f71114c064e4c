pub mod config;
pub mod templates;

pub use config::{AppConfig, ConfigError, LoadOptions, LogFormat};
pub use templates::{
    select_template, RenderInput, TemplateError, TemplateRenderer, WelcomeTemplate,
};
