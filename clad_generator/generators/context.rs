////////////////////////////////////////////////////////////////////////////////////
// Copyright (c) 2020 DasEtwas - All Rights Reserved                               /
//      Unauthorized copying of this file, via any medium is strictly prohibited   /
//      Proprietary and confidential                                               /
////////////////////////////////////////////////////////////////////////////////////

use std::{collections::HashMap, fmt::Write};

use super::{command_name, gen_enum_item, Command, DeclarationStyle, GeneratorOptions};
use crate::{
    error::{Error, Result},
    registry::{Api, RequirementKind, RequirementSet},
    xml::{Element, Node},
};

/// The text produced for one registry/target pair, before it is put into the skeletons.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GenerationContext {
    /// One line per `<type>`.
    pub types: String,
    /// One `#define` per required enum.
    pub enums: String,
    /// One `{ NULL, "glName" },` row per required command; row K backs wrapper K.
    pub command_lookup: String,
    /// Wrapper definitions that call through the lookup table.
    pub command_wrappers: String,
    /// What the header declares for each wrapper.
    pub command_decls: String,
    /// Rows in `command_lookup` so far, i.e. the next free slot.
    pub command_count: usize,
}

impl GenerationContext {
    pub fn new() -> GenerationContext {
        GenerationContext::default()
    }

    fn push_type(&mut self, ty: &Element) {
        ty.write_inner_text(&mut self.types);
        self.types.push('\n');
    }

    fn push_enum(&mut self, enm: &Element) -> Result<()> {
        let name = enm.attribute("name").map(|name| name.as_str()).unwrap_or_default();
        let value = enm.attribute("value").ok_or_else(|| Error::MalformedEnum { name: name.to_string() })?;
        let suffix = enm.attribute("type").map(|suffix| suffix.as_str());
        gen_enum_item(name, &value, suffix, &mut self.enums)?;
        Ok(())
    }

    /// Emits the wrapper, the lookup row and the declaration of `cmd`, taking the next slot.
    fn push_command(&mut self, cmd: &Command, options: &GeneratorOptions) -> Result<()> {
        let slot = self.command_count;
        let wrapper = options.wrapper_ident(&cmd.name);
        let prototype = cmd.gen_prototype(&wrapper);
        let names = cmd.gen_parameter_names();

        writeln!(self.command_wrappers, "{}", prototype)?;
        writeln!(
            self.command_wrappers,
            "{{\n    {ret}(({fn_ptr})(lookup[{slot}].proc))({names});\n}}\n",
            ret = if cmd.returns_void() { "" } else { "return " },
            fn_ptr = cmd.gen_fn_ptr_type(),
            slot = slot,
            names = names,
        )?;

        writeln!(self.command_lookup, "    {{ NULL, \"{}\" }},", cmd.name)?;

        writeln!(self.command_decls, "{};", prototype)?;
        if let DeclarationStyle::Macro = options.declarations {
            writeln!(
                self.command_decls,
                "#define {public}({names}) {wrapper}({names})",
                public = options.public_ident(&cmd.name),
                names = names,
                wrapper = wrapper,
            )?;
        }

        self.command_count += 1;
        Ok(())
    }
}

/// Turns the required part of `requirements` into C text.
///
/// Types are emitted unconditionally. Enums and commands follow the insertion order of
/// `requirements`, which makes the output a pure function of its inputs. A required name that
/// the registry does not define is an error.
pub fn synthesize(
    root: &Node,
    requirements: &RequirementSet,
    options: &GeneratorOptions,
    api: Api,
) -> Result<GenerationContext> {
    let root = root.as_element().ok_or(Error::MissingSection("registry"))?;
    let mut ctx = GenerationContext::new();

    let types = root.first_child("types").ok_or(Error::MissingSection("types"))?;
    for ty in types.children_named("type") {
        ctx.push_type(ty);
    }

    let enums = index_enums(root);
    let commands = index_commands(root);

    for (kind, name) in requirements.required() {
        match kind {
            RequirementKind::Enum => {
                let candidates = enums
                    .get(name.as_str())
                    .ok_or_else(|| Error::MissingEnum { name: name.to_string(), offset: name.offset() })?;
                ctx.push_enum(select_for_api(candidates, api))?;
            },
            RequirementKind::Command => {
                if commands.is_empty() && root.first_child("commands").is_none() {
                    return Err(Error::MissingSection("commands"));
                }
                let element = commands
                    .get(name.as_str())
                    .ok_or_else(|| Error::MissingCommand { name: name.to_string(), offset: name.offset() })?;
                let command = Command::from_element(element)?;
                ctx.push_command(&command, options)?;
            },
        }
    }

    debug!(
        "synthesized {} types, {} enums and {} commands",
        types.children_named("type").count(),
        ctx.enums.lines().count(),
        ctx.command_count
    );
    Ok(ctx)
}

/// Every `<enum>` of every `<enums>` group by name, in document order.
fn index_enums<'r, 'a>(root: &'r Element<'a>) -> HashMap<&'a str, Vec<&'r Element<'a>>> {
    let mut index: HashMap<&str, Vec<&Element>> = HashMap::new();
    for enm in root.children_named("enums").flat_map(|group| group.children_named("enum")) {
        match enm.attribute("name") {
            Some(name) => index.entry(name.as_str()).or_default().push(enm),
            None => warn!("<enum> without `name` at byte {}", enm.name.offset()),
        }
    }
    index
}

/// The first `<command>` of each name across all `<commands>` sections.
fn index_commands<'r, 'a>(root: &'r Element<'a>) -> HashMap<&'a str, &'r Element<'a>> {
    let mut index = HashMap::new();
    for command in root.children_named("commands").flat_map(|section| section.children_named("command")) {
        match command_name(command) {
            Some(name) => {
                index.entry(name.as_str()).or_insert(command);
            },
            None => warn!("<command> without a <proto><name> at byte {}", command.name.offset()),
        }
    }
    index
}

/// Prefers the definition meant for `api`, then one meant for every API, then the first.
fn select_for_api<'r, 'a>(candidates: &[&'r Element<'a>], api: Api) -> &'r Element<'a> {
    let api = api.to_string();
    candidates
        .iter()
        .find(|enm| enm.attribute("api").map_or(false, |a| a == api.as_str()))
        .or_else(|| candidates.iter().find(|enm| enm.attribute("api").is_none()))
        .copied()
        .unwrap_or(candidates[0])
}
