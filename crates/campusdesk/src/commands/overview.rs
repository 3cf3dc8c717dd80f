//! Read-only composite views: dashboard, menu, permissions, rooms of a
//! building.

use campusdesk_core::controller::BUILDING_FILTER;
use campusdesk_core::menu::{CampusPager, CampusTree, MenuItem};
use campusdesk_core::permissions::{group_permissions, permission_group};
use campusdesk_core::{Permission, Room};
use serde::Serialize;
use tabled::Tabled;

use super::{Context, entity_id, resource};
use crate::cli::ListArgs;
use crate::error::CliError;
use crate::output;

// ── Dashboard ───────────────────────────────────────────────────────

pub async fn dashboard(ctx: &Context<'_>) -> Result<(), CliError> {
    let pb = super::util::spinner("Loading statistics...", ctx.global);
    let dash = ctx.controller.dashboard().await;
    pb.finish_and_clear();

    if let Some(notice) = dash.notice.clone().filter(|n| n.is_error()) {
        output::print_notice(&notice, ctx.color, false);
        return Err(CliError::Api {
            message: notice.message,
            status: None,
        });
    }

    let cards = dash.cards();
    let out = output::render_single(
        ctx.global.output,
        &dash.stats,
        |_| output::render_pairs(cards.iter().map(|(title, n)| (*title, n.to_string()))),
        |s| format!("{}\n{}\n{}", s.campuses, s.blocks, s.buildings),
    );
    output::print_output(&out, ctx.global.quiet);
    Ok(())
}

// ── Menu ────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct MenuOutput {
    items: Vec<MenuItem>,
    pager: CampusPager,
}

pub async fn menu(ctx: &Context<'_>, page: u64) -> Result<(), CliError> {
    let pb = super::util::spinner("Loading menu...", ctx.global);
    let menu = ctx.controller.menu(page).await;
    pb.finish_and_clear();

    let data = MenuOutput {
        items: menu.items(),
        pager: menu.pager,
    };
    let out = output::render_single(
        ctx.global.output,
        &data,
        |m| {
            let mut lines = Vec::new();
            for item in &m.items {
                render_tree(item, "", &mut lines);
            }
            if let Some(footer) = menu.footer(true) {
                lines.push(format!("View All Campuses  {}", footer.view_all));
                if let Some(pager) = footer.pager {
                    lines.push(format!(
                        "Campus page {} of {}",
                        pager.current_page, pager.last_page
                    ));
                }
            }
            lines.join("\n")
        },
        |m| {
            let mut ids = Vec::new();
            for item in &m.items {
                collect_ids(item, &mut ids);
            }
            ids.join("\n")
        },
    );
    output::print_output(&out, ctx.global.quiet);

    if let CampusTree::Error(message) = menu.campuses {
        return Err(CliError::Api {
            message,
            status: None,
        });
    }
    Ok(())
}

/// Indented tree with box-drawing guides; links show their route.
fn render_tree(item: &MenuItem, indent: &str, lines: &mut Vec<String>) {
    let label = match item.route {
        Some(route) => format!("{}  {route}", item.label),
        None => item.label.clone(),
    };
    lines.push(format!("{indent}{label}"));

    let child_indent = |last: bool| {
        let stem = indent.replace("├─ ", "│  ").replace("└─ ", "   ");
        format!("{stem}{}", if last { "└─ " } else { "├─ " })
    };
    let count = item.children.len();
    for (i, child) in item.children.iter().enumerate() {
        render_tree(child, &child_indent(i + 1 == count), lines);
    }
}

fn collect_ids(item: &MenuItem, out: &mut Vec<String>) {
    out.push(item.id.clone());
    for child in &item.children {
        collect_ids(child, out);
    }
}

// ── Permissions ─────────────────────────────────────────────────────

#[derive(Tabled, Serialize)]
struct PermissionRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Permission")]
    name: String,
    #[tabled(rename = "Group")]
    group: String,
}

impl From<&Permission> for PermissionRow {
    fn from(p: &Permission) -> Self {
        Self {
            id: p.id.get(),
            name: p.name.clone(),
            group: permission_group(&p.name).to_owned(),
        }
    }
}

#[derive(Serialize)]
struct PermissionGroup {
    group: String,
    permissions: Vec<Permission>,
}

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Count")]
    count: usize,
    #[tabled(rename = "Permissions")]
    names: String,
}

impl From<&PermissionGroup> for GroupRow {
    fn from(g: &PermissionGroup) -> Self {
        Self {
            group: g.group.clone(),
            count: g.permissions.len(),
            names: g
                .permissions
                .iter()
                .map(|p| p.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

pub async fn permissions(ctx: &Context<'_>, grouped: bool) -> Result<(), CliError> {
    let pb = super::util::spinner("Loading permissions...", ctx.global);
    let result = ctx.controller.permissions().await;
    pb.finish_and_clear();
    let permissions = result.map_err(|e| ctx.fail(e))?;

    let out = if grouped {
        let groups: Vec<PermissionGroup> = group_permissions(&permissions)
            .into_iter()
            .map(|(group, permissions)| PermissionGroup { group, permissions })
            .collect();
        output::render_list(
            ctx.global.output,
            &groups,
            |g| GroupRow::from(g),
            |g| g.group.clone(),
        )
    } else {
        output::render_list(
            ctx.global.output,
            &permissions,
            |p| PermissionRow::from(p),
            |p| p.id.to_string(),
        )
    };
    output::print_output(&out, ctx.global.quiet);
    Ok(())
}

// ── Rooms of a building ─────────────────────────────────────────────

pub async fn rooms(ctx: &Context<'_>, building: u64, list: ListArgs) -> Result<(), CliError> {
    let building = entity_id(building)?;
    resource::list::<Room>(
        ctx,
        &list,
        vec![(BUILDING_FILTER.to_owned(), building.to_string())],
    )
    .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use campusdesk_core::EntityId;
    use campusdesk_core::menu::Route;

    use super::*;

    #[test]
    fn tree_uses_guides() {
        let tree = MenuItem::group(
            "campus",
            "AAU Campuses",
            vec![MenuItem::group(
                "campus-1",
                "Main",
                vec![
                    MenuItem::note("block-1", "Block A"),
                    MenuItem::link(
                        "building-9",
                        "Library",
                        Route::Rooms(EntityId::new(9).unwrap()),
                    ),
                ],
            )],
        );
        let mut lines = Vec::new();
        render_tree(&tree, "", &mut lines);
        assert_eq!(
            lines,
            vec![
                "AAU Campuses",
                "└─ Main",
                "   ├─ Block A",
                "   └─ Library  /rooms/9",
            ]
        );
    }
}
