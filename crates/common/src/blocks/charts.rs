//! The Charts block
//!
//! Shows one small chart (pedigree, descendants, hourglass or interactive
//! tree) of a configured individual on a tree or user dashboard.

use super::{BlockContext, ChartController, ChartPerson};
use crate::auth::CsrfGuard;
use crate::errors::Result;
use crate::gedcom;
use crate::metrics;
use crate::records::{Individual, Record};
use crate::store::PEDIGREE_ROOT_ID;
use crate::views::{self, BlockView};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use validator::{Validate, ValidationError};

/// Shown instead of a chart when no individual can be found.
pub const NOT_CONFIGURED: &str = "You must select an individual and a chart type in the block preferences";

const SETTING_TYPE: &str = "type";
const SETTING_PID: &str = "pid";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartType {
    Pedigree,
    Descendants,
    Hourglass,
    TreeNav,
}

impl ChartType {
    pub const ALL: [ChartType; 4] = [
        ChartType::Pedigree,
        ChartType::Descendants,
        ChartType::Hourglass,
        ChartType::TreeNav,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pedigree" => Some(ChartType::Pedigree),
            "descendants" => Some(ChartType::Descendants),
            "hourglass" => Some(ChartType::Hourglass),
            "treenav" => Some(ChartType::TreeNav),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChartType::Pedigree => "pedigree",
            ChartType::Descendants => "descendants",
            ChartType::Hourglass => "hourglass",
            ChartType::TreeNav => "treenav",
        }
    }

    /// Name in the chart type selector.
    pub fn label(self) -> &'static str {
        match self {
            ChartType::Pedigree => "Pedigree",
            ChartType::Descendants => "Descendants",
            ChartType::Hourglass => "Hourglass chart",
            ChartType::TreeNav => "Interactive tree",
        }
    }

    /// Block title for a chart of `name`.
    pub fn title(self, name: &str) -> String {
        match self {
            ChartType::Pedigree => format!("Pedigree of {}", name),
            ChartType::Descendants => format!("Descendants of {}", name),
            ChartType::Hourglass => format!("Hourglass chart of {}", name),
            ChartType::TreeNav => format!("Interactive tree of {}", name),
        }
    }

    /// All types, ordered by label ignoring case.
    pub fn sorted_by_label() -> Vec<ChartType> {
        let mut charts = Self::ALL.to_vec();
        charts.sort_by_key(|chart| chart.label().to_lowercase());
        charts
    }
}

/// Submission of the configuration form.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ChartsBlockForm {
    #[serde(default)]
    pub save: Option<String>,

    #[serde(default)]
    pub csrf: String,

    #[serde(rename = "type", default)]
    #[validate(custom(function = "validate_chart_type"))]
    pub chart_type: String,

    #[serde(default)]
    #[validate(custom(function = "validate_xref"))]
    pub pid: String,
}

impl ChartsBlockForm {
    fn wants_save(&self) -> bool {
        self.save
            .as_deref()
            .is_some_and(|save| !save.is_empty() && save != "0")
    }
}

fn validate_chart_type(value: &str) -> std::result::Result<(), ValidationError> {
    match ChartType::parse(value) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("chart_type")),
    }
}

fn validate_xref(value: &str) -> std::result::Result<(), ValidationError> {
    if gedcom::is_valid_xref(value) {
        Ok(())
    } else {
        Err(ValidationError::new("xref"))
    }
}

/// The Charts block module.
pub struct ChartsBlock {
    controller: Arc<dyn ChartController>,
}

impl ChartsBlock {
    pub const NAME: &'static str = "charts";
    pub const TITLE: &'static str = "Charts";
    pub const DESCRIPTION: &'static str = "An alternative way to display charts.";

    pub fn new(controller: Arc<dyn ChartController>) -> Self {
        Self { controller }
    }

    pub fn is_user_block(&self) -> bool {
        true
    }

    pub fn is_tree_block(&self) -> bool {
        true
    }

    /// Rendered after the page loads rather than inline.
    pub fn load_ajax(&self) -> bool {
        true
    }

    /// Render the block. `overrides` may replace the stored `type` and `pid`
    /// for this call only.
    pub async fn render(
        &self,
        ctx: &BlockContext<'_>,
        block_id: i32,
        use_template: bool,
        overrides: &HashMap<String, String>,
    ) -> Result<String> {
        let tree = ctx.tree();
        let root = ctx.settings.tree_preference(tree.id, PEDIGREE_ROOT_ID).await?;

        let chart_type = match overrides.get(SETTING_TYPE) {
            Some(chart_type) => chart_type.clone(),
            None => ctx
                .settings
                .block_setting(block_id, SETTING_TYPE)
                .await?
                .unwrap_or_else(|| ChartType::Pedigree.as_str().to_string()),
        };

        let pid = match overrides.get(SETTING_PID) {
            Some(pid) => Some(pid.clone()),
            None => match ctx.settings.block_setting(block_id, SETTING_PID).await? {
                Some(pid) => Some(pid),
                None => default_pid(ctx, root.clone()),
            },
        };

        let mut person = match pid.as_deref() {
            Some(pid) => ctx.resolver.individual(pid).await?,
            None => None,
        };

        if person.is_none() {
            info!(block_id, pid = ?pid, root = ?root, "Chart subject not found, resetting to tree root");
            ctx.settings
                .set_block_setting(block_id, SETTING_PID, root.as_deref())
                .await?;
            person = match root.as_deref() {
                Some(root) => ctx.resolver.individual(root).await?,
                None => None,
            };
        }

        let mut title = Self::TITLE.to_string();
        let content = match person {
            None => NOT_CONFIGURED.to_string(),
            Some(person) => {
                let subject = self.subject(ctx, &person).await?;
                match ChartType::parse(&chart_type) {
                    Some(chart) => {
                        title = chart.title(&subject.name);
                        self.chart_content(chart, &subject)
                    }
                    None => {
                        debug!(block_id, chart_type = %chart_type, "Unknown chart type");
                        String::new()
                    }
                }
            }
        };

        let chart_label = ChartType::parse(&chart_type).map_or("unknown", ChartType::as_str);
        metrics::record_block_render(Self::NAME, chart_label);

        if !use_template {
            return Ok(content);
        }

        let config_url = ctx
            .can_configure()
            .then(|| format!("/trees/{}/blocks/{}/edit", tree.name, block_id));
        let block_class = Self::NAME.replace('_', "-");
        let title = views::strip_tags(&title);

        Ok(views::block_template(&BlockView {
            block: &block_class,
            id: block_id,
            config_url: config_url.as_deref(),
            title: &title,
            content: &content,
        })
        .into_string())
    }

    /// Form for the block settings, current values preselected.
    pub async fn configure_form(&self, ctx: &BlockContext<'_>, block_id: i32, csrf_token: &str) -> Result<String> {
        let tree = ctx.tree();
        let root = ctx.settings.tree_preference(tree.id, PEDIGREE_ROOT_ID).await?;

        let chart_type = ctx
            .settings
            .block_setting(block_id, SETTING_TYPE)
            .await?
            .unwrap_or_else(|| ChartType::Pedigree.as_str().to_string());

        let pid = match ctx.settings.block_setting(block_id, SETTING_PID).await? {
            Some(pid) => Some(pid),
            None => default_pid(ctx, root),
        };

        let pid_name = match pid.as_deref() {
            Some(pid) => match ctx.resolver.individual(pid).await? {
                Some(person) => Some(self.subject(ctx, &person).await?.name),
                None => None,
            },
            None => None,
        };

        let charts: Vec<(&str, &str)> = ChartType::sorted_by_label()
            .into_iter()
            .map(|chart| (chart.as_str(), chart.label()))
            .collect();
        let action = format!("/trees/{}/blocks/{}/edit", tree.name, block_id);

        Ok(views::charts_config_form(
            &action,
            &charts,
            &chart_type,
            pid.as_deref().unwrap_or(""),
            pid_name.as_deref(),
            csrf_token,
        )
        .into_string())
    }

    /// Store a submitted configuration. Returns whether anything was saved;
    /// a submission that fails any check is dropped as a whole.
    pub async fn save_configuration(
        &self,
        ctx: &BlockContext<'_>,
        block_id: i32,
        form: &ChartsBlockForm,
        csrf: &CsrfGuard,
    ) -> Result<bool> {
        if !form.wants_save() {
            return Ok(false);
        }

        if !ctx.can_configure() {
            warn!(block_id, user_id = ?ctx.viewer.user_id, "Block configuration without edit rights");
            return Ok(false);
        }

        if !csrf.verify(ctx.viewer.user_id, &form.csrf) {
            warn!(block_id, user_id = ?ctx.viewer.user_id, "Block configuration with bad CSRF token");
            return Ok(false);
        }

        if let Err(errors) = form.validate() {
            debug!(block_id, errors = %errors, "Ignoring invalid block configuration");
            return Ok(false);
        }

        ctx.settings
            .set_block_setting(block_id, SETTING_TYPE, Some(&form.chart_type))
            .await?;
        ctx.settings
            .set_block_setting(block_id, SETTING_PID, Some(&form.pid))
            .await?;

        info!(block_id, chart_type = %form.chart_type, pid = %form.pid, "Block configuration saved");

        Ok(true)
    }

    /// The subject as charts see it, with the name hidden from viewers who
    /// may not see the record.
    async fn subject(&self, ctx: &BlockContext<'_>, person: &Individual) -> Result<ChartPerson> {
        let name = if ctx.resolver.can_show(person, ctx.viewer.access_level()).await? {
            person.full_name()
        } else {
            debug!(xref = %person.xref(), "Chart subject is private");
            "Private".to_string()
        };

        Ok(ChartPerson::new(person, name))
    }

    fn chart_content(&self, chart: ChartType, person: &ChartPerson) -> String {
        let controller = self.controller.as_ref();

        let markup = match chart {
            ChartType::Pedigree => views::chart_pair(
                Some("myCharts"),
                &controller.print_pedigree_person(person),
                &controller.print_person_pedigree(person, 1),
                &controller.setup_javascript(),
            ),
            ChartType::Descendants => views::chart_single(
                &controller.print_descendancy(person, 1, false),
                &controller.setup_javascript(),
            ),
            ChartType::Hourglass => views::chart_pair(
                None,
                &controller.print_descendancy(person, 1, false),
                &controller.print_person_pedigree(person, 1),
                &controller.setup_javascript(),
            ),
            ChartType::TreeNav => {
                let (viewport, script) = controller.draw_viewport(person, 2);
                views::tree_view(
                    controller.tree_view_css_url(),
                    controller.tree_view_js_url(),
                    &viewport,
                    &script,
                )
            }
        };

        markup.into_string()
    }
}

/// The signed-in user's own individual, else the tree root.
fn default_pid(ctx: &BlockContext<'_>, root: Option<String>) -> Option<String> {
    if ctx.viewer.is_signed_in() {
        ctx.viewer.individual_xref.clone().or(root)
    } else {
        root
    }
}
