//! Dashboard block handlers

use super::{tree_scope, TreeScope};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    Form,
};
use serde::Deserialize;
use std::collections::HashMap;
use tracing::debug;
use webtrees_common::auth::Session;
use webtrees_common::blocks::{BlockContext, ChartsBlock, ChartsBlockForm, DashboardKind};
use webtrees_common::errors::{AppError, Result};
use webtrees_common::store::Block;

/// Query parameters of a block render. `type` and `pid` override the stored
/// settings for this request only.
#[derive(Debug, Default, Deserialize)]
pub struct BlockQuery {
    #[serde(default)]
    pub template: Option<String>,
    #[serde(rename = "type", default)]
    pub chart_type: Option<String>,
    #[serde(default)]
    pub pid: Option<String>,
}

impl BlockQuery {
    /// Wrapped in the block template unless `template=0`.
    fn use_template(&self) -> bool {
        !matches!(self.template.as_deref(), Some("0") | Some("false"))
    }

    fn overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        if let Some(chart_type) = &self.chart_type {
            overrides.insert("type".to_string(), chart_type.clone());
        }
        if let Some(pid) = &self.pid {
            overrides.insert("pid".to_string(), pid.clone());
        }
        overrides
    }
}

/// The Charts block `block_id`, if it belongs to this tree and, for a user
/// dashboard, to the viewer.
async fn find_block(state: &AppState, scope: &TreeScope, block_id: i32) -> Result<Block> {
    let block = state.settings.find_block(block_id).await?;

    let visible = block.filter(|block| {
        let placed = match DashboardKind::of(block) {
            DashboardKind::Tree => state.charts.is_tree_block(),
            DashboardKind::User => {
                state.charts.is_user_block() && block.user_id == scope.viewer.user_id
            }
        };

        placed
            && block.module_name == ChartsBlock::NAME
            && block.tree_id.map_or(true, |id| id == scope.resolver.tree().id)
    });

    visible.ok_or_else(|| {
        debug!(block_id, tree = %scope.resolver.tree().name, "Block not available here");
        AppError::BlockNotFound { id: block_id }
    })
}

fn block_context<'a>(state: &'a AppState, scope: &'a TreeScope, block: &Block) -> BlockContext<'a> {
    BlockContext {
        viewer: &scope.viewer,
        dashboard: DashboardKind::of(block),
        resolver: &scope.resolver,
        settings: state.settings.as_ref(),
    }
}

/// Render a block, by default wrapped in its card.
pub async fn render_block(
    State(state): State<AppState>,
    session: Session,
    Path((tree_name, block_id)): Path<(String, i32)>,
    Query(query): Query<BlockQuery>,
) -> Result<Html<String>> {
    let scope = tree_scope(&state, &tree_name, session).await?;
    let block = find_block(&state, &scope, block_id).await?;
    let ctx = block_context(&state, &scope, &block);

    let html = state
        .charts
        .render(&ctx, block.id, query.use_template(), &query.overrides())
        .await?;

    Ok(Html(html))
}

/// Configuration form of a block.
pub async fn edit_block(
    State(state): State<AppState>,
    session: Session,
    Path((tree_name, block_id)): Path<(String, i32)>,
) -> Result<Html<String>> {
    let scope = tree_scope(&state, &tree_name, session).await?;
    let block = find_block(&state, &scope, block_id).await?;
    let ctx = block_context(&state, &scope, &block);

    if !ctx.can_configure() {
        return Err(AppError::Forbidden {
            message: "You may not configure this block".to_string(),
        });
    }

    let csrf_token = state.csrf.token(scope.viewer.user_id);
    let html = state.charts.configure_form(&ctx, block.id, &csrf_token).await?;

    Ok(Html(html))
}

/// Store a submitted configuration, then return to the block. Rejected
/// submissions redirect the same way.
pub async fn save_block(
    State(state): State<AppState>,
    session: Session,
    Path((tree_name, block_id)): Path<(String, i32)>,
    Form(form): Form<ChartsBlockForm>,
) -> Result<Redirect> {
    let scope = tree_scope(&state, &tree_name, session).await?;
    let block = find_block(&state, &scope, block_id).await?;
    let ctx = block_context(&state, &scope, &block);

    let saved = state
        .charts
        .save_configuration(&ctx, block.id, &form, &state.csrf)
        .await?;
    debug!(block_id, saved, "Block configuration submitted");

    Ok(Redirect::to(&format!("/trees/{}/blocks/{}", tree_name, block_id)))
}

#[cfg(test)]
mod tests {
    use crate::test_support::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;
    use webtrees_common::auth::CsrfGuard;
    use webtrees_common::store::{Block, MemoryStore};
    use webtrees_common::SettingStore;

    fn get(uri: &str, user_id: Option<i32>) -> Request<Body> {
        let mut request = Request::get(uri);
        if let Some(user_id) = user_id {
            request = request.header(header::AUTHORIZATION, bearer(user_id));
        }
        request.body(Body::empty()).unwrap()
    }

    fn post(uri: &str, user_id: Option<i32>, body: &str) -> Request<Body> {
        let mut request = Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(user_id) = user_id {
            request = request.header(header::AUTHORIZATION, bearer(user_id));
        }
        request.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_render_tree_block() {
        let response = router(store()).oneshot(get("/trees/demo/blocks/10", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_string(response).await;
        assert!(html.contains("id=\"block-10\""));
        assert!(html.contains("Pedigree of Ada Lovelace"));
        // visitors get no configuration link
        assert!(!html.contains("wt-block-config"));
    }

    #[tokio::test]
    async fn test_render_overrides_and_bare_content() {
        let uri = "/trees/demo/blocks/10?template=0&type=treenav";
        let response = router(store()).oneshot(get(uri, Some(7))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_string(response).await;
        assert!(!html.contains("wt-block-charts"));
        assert!(html.contains("tv_tree"));
    }

    #[tokio::test]
    async fn test_manager_sees_config_link() {
        let response = router(store()).oneshot(get("/trees/demo/blocks/10", Some(7))).await.unwrap();
        let html = body_string(response).await;
        assert!(html.contains("href=\"/trees/demo/blocks/10/edit\""));
    }

    #[tokio::test]
    async fn test_block_must_belong_to_tree() {
        let store = store();
        store.add_block(Block { id: 11, tree_id: Some(2), user_id: None, module_name: "charts".into() });
        store.add_block(Block { id: 12, tree_id: Some(1), user_id: None, module_name: "html".into() });
        let app = router(store);

        for uri in ["/trees/demo/blocks/11", "/trees/demo/blocks/12", "/trees/demo/blocks/99"] {
            let response = app.clone().oneshot(get(uri, None)).await.unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_user_block_only_for_owner() {
        let store = store();
        store.add_block(Block { id: 20, tree_id: None, user_id: Some(8), module_name: "charts".into() });
        let app = router(store);

        let response = app.clone().oneshot(get("/trees/demo/blocks/20", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app.oneshot(get("/trees/demo/blocks/20", Some(8))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.contains("/trees/demo/blocks/20/edit"));
    }

    #[tokio::test]
    async fn test_edit_form_requires_rights() {
        let app = router(store());

        let response = app.clone().oneshot(get("/trees/demo/blocks/10/edit", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app.oneshot(get("/trees/demo/blocks/10/edit", Some(7))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let html = body_string(response).await;
        let token = CsrfGuard::new("test-csrf").token(Some(7));
        assert!(html.contains(&token));
        assert!(html.contains("value=\"I1\""));
    }

    async fn submit(store: &std::sync::Arc<MemoryStore>, user_id: Option<i32>, body: &str) -> StatusCode {
        let response = router(store.clone())
            .oneshot(post("/trees/demo/blocks/10/edit", user_id, body))
            .await
            .unwrap();

        if response.status() == StatusCode::SEE_OTHER {
            assert_eq!(response.headers()[header::LOCATION], "/trees/demo/blocks/10");
        }
        response.status()
    }

    #[tokio::test]
    async fn test_save_configuration() {
        let store = store();
        store.add_record(1, "0 @I2@ INDI\n1 NAME Byron //");
        let token = CsrfGuard::new("test-csrf").token(Some(7));

        let status = submit(&store, Some(7), &format!("save=1&csrf={}&type=hourglass&pid=I2", token)).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(store.block_setting(10, "type").await.unwrap().as_deref(), Some("hourglass"));
        assert_eq!(store.block_setting(10, "pid").await.unwrap().as_deref(), Some("I2"));
    }

    #[tokio::test]
    async fn test_rejected_submissions_still_redirect() {
        let store = store();
        let token = CsrfGuard::new("test-csrf").token(Some(7));

        let bodies = [
            // visitor
            (None, format!("save=1&csrf={}&type=hourglass&pid=I1", token)),
            // wrong token
            (Some(7), "save=1&csrf=forged&type=hourglass&pid=I1".to_string()),
            // unknown chart type
            (Some(7), format!("save=1&csrf={}&type=fan&pid=I1", token)),
        ];

        for (user_id, body) in bodies {
            assert_eq!(submit(&store, user_id, &body).await, StatusCode::SEE_OTHER);
        }

        assert_eq!(store.block_setting(10, "type").await.unwrap(), None);
    }
}
