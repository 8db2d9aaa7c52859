//! Embedded project templates
//!
//! The default project configuration and the seed parts catalogue ship inside
//! the binary and are rendered with tera at `scaf init`.

use rust_embed::Embed;
use tera::Tera;
use thiserror::Error;

use crate::core::allocate::AllocationMode;
use crate::core::needs::{DEFAULT_DECK_WIDTHS, DEFAULT_LEVEL_HEIGHT, DEFAULT_SEGMENT_LENGTHS};
use crate::core::segment::SegmentStrategy;

const CONFIG_TEMPLATE: &str = "config.yaml.tera";
const PARTS_TEMPLATE: &str = "parts.yaml";

/// Low-stock threshold written into new projects
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

/// Context for the project config template
#[derive(Debug, Clone)]
pub struct ConfigContext {
    pub operator: Option<String>,
    pub standard_level_height: f64,
    pub segment_lengths: Vec<f64>,
    pub deck_widths: Vec<f64>,
    pub low_stock_threshold: u32,
    pub segment_strategy: SegmentStrategy,
    pub allocation_mode: AllocationMode,
}

impl Default for ConfigContext {
    fn default() -> Self {
        Self {
            operator: None,
            standard_level_height: DEFAULT_LEVEL_HEIGHT,
            segment_lengths: DEFAULT_SEGMENT_LENGTHS.to_vec(),
            deck_widths: DEFAULT_DECK_WIDTHS.to_vec(),
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            segment_strategy: SegmentStrategy::default(),
            allocation_mode: AllocationMode::default(),
        }
    }
}

/// Template generator backed by the embedded template folder
pub struct TemplateGenerator {
    tera: Tera,
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template rendering error: {0}")]
    RenderError(String),
}

impl TemplateGenerator {
    /// Create a new template generator with embedded templates
    pub fn new() -> Result<Self, TemplateError> {
        let mut tera = Tera::default();

        for file in EmbeddedTemplates::iter() {
            let filename = file.as_ref();
            if let Some(content) = EmbeddedTemplates::get(filename) {
                if let Ok(template_str) = std::str::from_utf8(&content.data) {
                    tera.add_raw_template(filename, template_str)
                        .map_err(|e| TemplateError::RenderError(e.to_string()))?;
                }
            }
        }

        Ok(Self { tera })
    }

    /// Render the project config with built-in defaults
    pub fn default_config(&self) -> Result<String, TemplateError> {
        self.config(&ConfigContext::default())
    }

    /// Render the project config
    pub fn config(&self, ctx: &ConfigContext) -> Result<String, TemplateError> {
        let mut context = tera::Context::new();
        context.insert("operator", &ctx.operator.clone().unwrap_or_default());
        context.insert("standard_level_height", &format_meters(ctx.standard_level_height));
        context.insert(
            "segment_lengths",
            &ctx.segment_lengths.iter().map(|v| format_meters(*v)).collect::<Vec<_>>(),
        );
        context.insert(
            "deck_widths",
            &ctx.deck_widths.iter().map(|v| format_meters(*v)).collect::<Vec<_>>(),
        );
        context.insert("low_stock_threshold", &ctx.low_stock_threshold);
        context.insert("segment_strategy", &ctx.segment_strategy.to_string());
        context.insert("allocation_mode", &ctx.allocation_mode.to_string());

        self.render(CONFIG_TEMPLATE, &context)
    }

    /// The seed catalogue of standard scaffolding parts
    pub fn seed_parts(&self) -> Result<String, TemplateError> {
        self.render(PARTS_TEMPLATE, &tera::Context::new())
    }

    fn render(&self, name: &str, context: &tera::Context) -> Result<String, TemplateError> {
        if !self.tera.get_template_names().any(|n| n == name) {
            return Err(TemplateError::NotFound(name.to_string()));
        }
        self.tera
            .render(name, context)
            .map_err(|e| TemplateError::RenderError(e.to_string()))
    }
}

/// Format a length so whole numbers keep a decimal point (`2` -> `2.0`)
fn format_meters(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}
