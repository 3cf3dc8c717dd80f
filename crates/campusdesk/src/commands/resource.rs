//! Generic list/get/create/update/delete for every resource kind.
//!
//! Tables come from the resource's column set, forms from its request's
//! field specs, so one handler serves all ten subcommands.

use campusdesk_core::page::delete_prompt;
use campusdesk_core::request::{
    FieldKind, FieldSpec, FormMode, FormRequest, FormValues, Lookup, Requirement,
};
use campusdesk_core::table::TableState;
use campusdesk_core::{CoreError, EntityId, Notice, PageRequest, Resource};
use dialoguer::{Confirm, Input, MultiSelect, Select};
use serde::Serialize;
use tabled::Tabled;

use super::util::{self, prompt_err};
use super::{Context, entity_id};
use crate::cli::{FormArgs, ListArgs, OutputFormat, ResourceArgs, ResourceCommand};
use crate::error::CliError;
use crate::output;

pub async fn handle<R: Resource>(ctx: &Context<'_>, args: ResourceArgs) -> Result<(), CliError> {
    match args.command {
        ResourceCommand::List(list_args) => list::<R>(ctx, &list_args, Vec::new()).await,
        ResourceCommand::Get { id } => get::<R>(ctx, entity_id(id)?).await,
        ResourceCommand::Create(form) => save::<R>(ctx, FormMode::Create, &form).await,
        ResourceCommand::Update { id, form } => {
            save::<R>(ctx, FormMode::Edit(entity_id(id)?), &form).await
        }
        ResourceCommand::Delete { id } => delete::<R>(ctx, entity_id(id)?).await,
        ResourceCommand::Fields => {
            fields::<R>(ctx);
            Ok(())
        }
    }
}

// ── List ────────────────────────────────────────────────────────────

/// Fetch one page (or every page with `--all`), then search, sort and print.
pub async fn list<R: Resource>(
    ctx: &Context<'_>,
    args: &ListArgs,
    mut query: Vec<(String, String)>,
) -> Result<(), CliError> {
    for raw in &args.filter {
        query.push(util::parse_assignment(raw, "filter")?);
    }
    let filters: Vec<(&str, String)> =
        query.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
    let limit = ctx.page_size(args.limit);

    let pb = util::spinner(&format!("Loading {}...", R::KIND.plural_title()), ctx.global);
    let fetched = if args.all {
        ctx.controller
            .list_all::<R>(limit, &filters)
            .await
            .map(|rows| {
                let size = rows.len().max(1);
                (rows, TableState::client().with_page_size(size))
            })
    } else {
        ctx.controller
            .list::<R>(PageRequest::new(args.page, limit), &filters)
            .await
            .map(|page| {
                let size = usize::try_from(limit).unwrap_or(usize::MAX);
                let mut table = TableState::server().with_page_size(size);
                table.set_server_meta(page.meta);
                (page.data, table)
            })
    };
    pb.finish_and_clear();
    let (rows, mut table) = fetched.map_err(|e| ctx.fail(e))?;

    let columns = R::columns();
    if let Some(search) = &args.search {
        table.set_global_filter(search.as_str());
    }
    if let Some(sort) = &args.sort {
        let column = columns.iter().find(|c| c.id == sort.as_str());
        if !column.is_some_and(|c| table.set_sort(c, args.desc)) {
            let sortable: Vec<&str> = columns.iter().filter(|c| c.sortable).map(|c| c.id).collect();
            return Err(CliError::Validation {
                field: "sort".into(),
                reason: format!(
                    "'{sort}' is not a sortable {} column. Choose one of: {}",
                    R::KIND.label(),
                    sortable.join(", ")
                ),
            });
        }
    }

    let view = table.view(&rows, &columns);
    let out = output::render_view(ctx.global.output, &view, &rows, |r| r.id().to_string());
    output::print_output(&out, ctx.global.quiet);
    Ok(())
}

// ── Get ─────────────────────────────────────────────────────────────

async fn fetch<R: Resource>(ctx: &Context<'_>, id: EntityId) -> Result<R, CliError> {
    ctx.controller.get::<R>(id).await.map_err(|e| match e {
        CoreError::NotFound { .. } => CliError::NotFound {
            resource: R::KIND.title(),
            id: id.to_string(),
            command: R::KIND.to_string(),
        },
        other => ctx.fail(other),
    })
}

async fn get<R: Resource>(ctx: &Context<'_>, id: EntityId) -> Result<(), CliError> {
    let row = fetch::<R>(ctx, id).await?;
    let out = output::render_single(ctx.global.output, &row, detail::<R>, |r| r.id().to_string());
    output::print_output(&out, ctx.global.quiet);
    Ok(())
}

/// Key/value view built from the resource's columns, untruncated.
fn detail<R: Resource>(row: &R) -> String {
    let columns = R::columns();
    output::render_pairs(
        std::iter::once(("ID", row.id().to_string()))
            .chain(columns.iter().map(|c| (c.header, c.text(row)))),
    )
}

// ── Create / update ─────────────────────────────────────────────────

async fn save<R: Resource>(
    ctx: &Context<'_>,
    mode: FormMode,
    args: &FormArgs,
) -> Result<(), CliError> {
    let mut values = match mode {
        FormMode::Edit(id) => fetch::<R>(ctx, id).await?.form_values(),
        FormMode::Create => FormValues::new(),
    };
    for (key, value) in collect_input::<R>(args)? {
        values.set(key, value);
    }

    if !args.no_prompt && util::interactive() {
        prompt_missing::<R>(ctx, mode, &mut values).await?;
    }

    let request = R::Request::build(&values, mode).map_err(|f| CliError::invalid_form(&f))?;

    let pb = util::spinner(&format!("Saving {}...", R::KIND.label()), ctx.global);
    let result = ctx.controller.save::<R>(mode, &request).await;
    pb.finish_and_clear();
    let saved = result.map_err(|e| {
        output::print_notice(&Notice::save_failed(R::KIND, &e), ctx.color, false);
        ctx.fail(e)
    })?;

    output::print_notice(&Notice::saved(R::KIND, mode), ctx.color, ctx.global.quiet);
    if let Some(row) = saved.data {
        let out =
            output::render_single(ctx.global.output, &row, detail::<R>, |r| r.id().to_string());
        output::print_output(&out, ctx.global.quiet);
    }
    Ok(())
}

/// `--from-file` values first, then `--set` on top. Unknown keys are
/// rejected so typos do not silently drop input.
fn collect_input<R: Resource>(args: &FormArgs) -> Result<Vec<(String, String)>, CliError> {
    let mut input = match &args.from_file {
        Some(path) => util::read_form_file(path)?,
        None => Vec::new(),
    };
    for raw in &args.set {
        input.push(util::parse_assignment(raw, "set")?);
    }

    let fields = R::Request::fields();
    if let Some((key, _)) = input.iter().find(|(k, _)| !fields.iter().any(|f| f.key == k)) {
        let known: Vec<&str> = fields.iter().map(|f| f.key).collect();
        return Err(CliError::Validation {
            field: key.clone(),
            reason: format!(
                "unknown {} field. Valid fields: {}",
                R::KIND.label(),
                known.join(", ")
            ),
        });
    }
    Ok(input)
}

/// Ask for every required field still blank.
async fn prompt_missing<R: Resource>(
    ctx: &Context<'_>,
    mode: FormMode,
    values: &mut FormValues,
) -> Result<(), CliError> {
    for field in R::Request::fields() {
        if !field.is_required(mode) || !values.raw(field.key).trim().is_empty() {
            continue;
        }
        let value = prompt_field(ctx, field).await?;
        values.set(field.key, value);
    }
    Ok(())
}

async fn prompt_field(ctx: &Context<'_>, field: &FieldSpec) -> Result<String, CliError> {
    match field.kind {
        FieldKind::Password => Ok(rpassword::prompt_password(format!("{}: ", field.label))?),
        FieldKind::Toggle => {
            let on = Confirm::new()
                .with_prompt(field.label)
                .default(true)
                .interact()
                .map_err(prompt_err)?;
            Ok(on.to_string())
        }
        FieldKind::Choice(lookup) => {
            let options = lookup_options(ctx, lookup, field).await?;
            let names: Vec<&str> = options.iter().map(|(_, name)| name.as_str()).collect();
            let picked = Select::new()
                .with_prompt(field.label)
                .items(&names)
                .default(0)
                .interact()
                .map_err(prompt_err)?;
            Ok(options.get(picked).map(|(id, _)| id.to_string()).unwrap_or_default())
        }
        FieldKind::MultiChoice(lookup) => {
            let options = lookup_options(ctx, lookup, field).await?;
            let names: Vec<&str> = options.iter().map(|(_, name)| name.as_str()).collect();
            let picked = MultiSelect::new()
                .with_prompt(field.label)
                .items(&names)
                .interact()
                .map_err(prompt_err)?;
            Ok(picked
                .into_iter()
                .filter_map(|i| options.get(i).map(|(id, _)| id.to_string()))
                .collect::<Vec<_>>()
                .join(","))
        }
        FieldKind::Text
        | FieldKind::LongText
        | FieldKind::Email
        | FieldKind::Decimal
        | FieldKind::Count => Input::<String>::new()
            .with_prompt(field.label)
            .interact_text()
            .map_err(prompt_err),
    }
}

async fn lookup_options(
    ctx: &Context<'_>,
    lookup: Lookup,
    field: &FieldSpec,
) -> Result<Vec<(EntityId, String)>, CliError> {
    let options = match lookup {
        Lookup::Resource(kind) => ctx.controller.lookup(kind).await,
        Lookup::Permissions => ctx
            .controller
            .permissions()
            .await
            .map(|ps| ps.into_iter().map(|p| (p.id, p.name)).collect()),
    }
    .map_err(|e| ctx.fail(e))?;

    if options.is_empty() {
        return Err(CliError::Validation {
            field: field.key.into(),
            reason: format!("no {} options are available", field.label),
        });
    }
    Ok(options)
}

// ── Delete ──────────────────────────────────────────────────────────

async fn delete<R: Resource>(ctx: &Context<'_>, id: EntityId) -> Result<(), CliError> {
    let row = fetch::<R>(ctx, id).await?;
    let prompt = delete_prompt(R::KIND, row.display_name());
    if !util::confirm(&prompt, &format!("{} delete", R::KIND), ctx.global.yes)? {
        output::print_notice(&Notice::info("Delete cancelled"), ctx.color, ctx.global.quiet);
        return Ok(());
    }

    let pb = util::spinner(&format!("Deleting {}...", R::KIND.label()), ctx.global);
    let result = ctx.controller.delete::<R>(id).await;
    pb.finish_and_clear();
    match result {
        Ok(_) => {
            output::print_notice(&Notice::deleted(R::KIND), ctx.color, ctx.global.quiet);
            Ok(())
        }
        Err(e) => {
            output::print_notice(&Notice::delete_failed(R::KIND), ctx.color, false);
            Err(ctx.fail(e))
        }
    }
}

// ── Fields ──────────────────────────────────────────────────────────

#[derive(Clone, Tabled, Serialize)]
struct FieldRow {
    #[tabled(rename = "Key")]
    key: &'static str,
    #[tabled(rename = "Label")]
    label: &'static str,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Required")]
    required: &'static str,
}

impl From<&FieldSpec> for FieldRow {
    fn from(f: &FieldSpec) -> Self {
        Self {
            key: f.key,
            label: f.label,
            kind: kind_label(f.kind),
            required: match f.requirement {
                Requirement::Always => "yes",
                Requirement::OnCreate => "on create",
                Requirement::Optional => "no",
            },
        }
    }
}

#[derive(Clone, Tabled, Serialize)]
struct ColumnRow {
    #[tabled(rename = "Column")]
    id: &'static str,
    #[tabled(rename = "Header")]
    header: &'static str,
    #[tabled(rename = "Sortable")]
    sortable: bool,
}

fn kind_label(kind: FieldKind) -> String {
    match kind {
        FieldKind::Text => "text".into(),
        FieldKind::LongText => "long text".into(),
        FieldKind::Email => "email".into(),
        FieldKind::Password => "password".into(),
        FieldKind::Decimal => "decimal".into(),
        FieldKind::Count => "count".into(),
        FieldKind::Toggle => "true/false".into(),
        FieldKind::Choice(Lookup::Resource(k)) => format!("{} id", k.label()),
        FieldKind::Choice(Lookup::Permissions) => "permission id".into(),
        FieldKind::MultiChoice(Lookup::Resource(k)) => format!("{} ids", k.label()),
        FieldKind::MultiChoice(Lookup::Permissions) => "permission ids".into(),
    }
}

#[derive(Serialize)]
struct Schema {
    fields: Vec<FieldRow>,
    columns: Vec<ColumnRow>,
}

fn fields<R: Resource>(ctx: &Context<'_>) {
    let schema = Schema {
        fields: R::Request::fields().iter().map(FieldRow::from).collect(),
        columns: R::columns()
            .iter()
            .map(|c| ColumnRow {
                id: c.id,
                header: c.header,
                sortable: c.sortable,
            })
            .collect(),
    };

    let format = ctx.global.output;
    let out = if format == OutputFormat::Table {
        format!(
            "{}\n{}",
            output::render_list(format, &schema.fields, FieldRow::clone, |f| f.key.to_owned()),
            output::render_list(format, &schema.columns, ColumnRow::clone, |c| c.id.to_owned()),
        )
    } else {
        output::render_single(format, &schema, |_| String::new(), |s| {
            s.fields.iter().map(|f| f.key).collect::<Vec<_>>().join("\n")
        })
    };
    output::print_output(&out, ctx.global.quiet);
}

#[cfg(test)]
mod tests {
    use campusdesk_core::ResourceKind;

    use super::*;

    #[test]
    fn field_kinds_describe_input() {
        assert_eq!(
            kind_label(FieldKind::Choice(Lookup::Resource(ResourceKind::Block))),
            "block id"
        );
        assert_eq!(kind_label(FieldKind::MultiChoice(Lookup::Permissions)), "permission ids");
    }
}
