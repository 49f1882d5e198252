//! Chart controllers
//!
//! The Charts block only arranges fragments; drawing relatives is the job of
//! a [`ChartController`]. [`BoxChartController`] draws the subject alone.

use crate::config::ChartsConfig;
use crate::records::{Individual, Record};
use crate::views;

/// What a chart needs to know about its subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPerson {
    pub xref: String,
    /// Display name, already reduced to "Private" when hidden.
    pub name: String,
    pub sex: String,
}

impl ChartPerson {
    pub fn new(individual: &Individual, name: String) -> Self {
        Self {
            xref: individual.xref().to_string(),
            name,
            sex: individual.sex().to_string(),
        }
    }
}

/// Renders chart fragments. Every method returns HTML (or script) that the
/// block embeds verbatim.
pub trait ChartController: Send + Sync {
    /// A single person box.
    fn print_pedigree_person(&self, person: &ChartPerson) -> String;

    /// Ancestors of `person`, `generations` deep.
    fn print_person_pedigree(&self, person: &ChartPerson, generations: u32) -> String;

    /// Descendants of `person`, `generations` deep.
    fn print_descendancy(&self, person: &ChartPerson, generations: u32, show_spouses: bool) -> String;

    /// Script run after the chart is inserted into the page.
    fn setup_javascript(&self) -> String;

    /// Interactive tree viewport as `(html, script)`.
    fn draw_viewport(&self, person: &ChartPerson, generations: u32) -> (String, String);

    fn tree_view_css_url(&self) -> &str;

    fn tree_view_js_url(&self) -> &str;
}

/// Draws person boxes only.
pub struct BoxChartController {
    css_url: String,
    js_url: String,
}

impl BoxChartController {
    pub fn new(config: &ChartsConfig) -> Self {
        Self {
            css_url: config.tree_view_css_url.clone(),
            js_url: config.tree_view_js_url.clone(),
        }
    }
}

impl ChartController for BoxChartController {
    fn print_pedigree_person(&self, person: &ChartPerson) -> String {
        views::person_box(person).into_string()
    }

    fn print_person_pedigree(&self, person: &ChartPerson, generations: u32) -> String {
        views::chart_frame("pedigree", person, generations).into_string()
    }

    fn print_descendancy(&self, person: &ChartPerson, generations: u32, show_spouses: bool) -> String {
        let kind = if show_spouses { "descendancy spouses" } else { "descendancy" };
        views::chart_frame(kind, person, generations).into_string()
    }

    fn setup_javascript(&self) -> String {
        "document.querySelectorAll('.wt-chart-box').forEach(function (box) { box.classList.add('ready'); });"
            .to_string()
    }

    fn draw_viewport(&self, person: &ChartPerson, generations: u32) -> (String, String) {
        let html = views::tree_viewport(person, generations).into_string();
        let js = format!("var treeview = new TreeViewHandler('tv', {});", generations);
        (html, js)
    }

    fn tree_view_css_url(&self) -> &str {
        &self.css_url
    }

    fn tree_view_js_url(&self) -> &str {
        &self.js_url
    }
}
