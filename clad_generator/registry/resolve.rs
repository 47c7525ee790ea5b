////////////////////////////////////////////////////////////////////////////////////
// Copyright (c) 2019 DasEtwas - All Rights Reserved                               /
//      Unauthorized copying of this file, via any medium is strictly prohibited   /
//      Proprietary and confidential                                               /
////////////////////////////////////////////////////////////////////////////////////

use super::{Api, Profile, RequirementKind, RequirementSet, Version};
use crate::xml::{Element, Node};

/// Computes which enums and commands make up `api` `version` in `profile`.
///
/// Every `<feature>` of `api` up to and including `version` is applied in ascending version
/// order. Inside a feature, `<require>` and `<remove>` blocks are applied in document order and
/// the last write for a name wins, so a later version can re-add what an earlier one removed.
///
/// Malformed features and references are logged and skipped.
pub fn resolve<'a>(root: &Node<'a>, api: Api, profile: Profile, version: Version) -> RequirementSet<'a> {
    let mut requirements = RequirementSet::new();

    let root = match root {
        Node::Element(root) => root,
        Node::Text(_) => {
            warn!("registry root is text, not an element; nothing to resolve");
            return requirements;
        },
    };

    let mut features: Vec<(Version, &Element<'a>)> = root
        .children_named("feature")
        .filter_map(|feature| applicable_version(feature, api, version).map(|v| (v, feature)))
        .collect();
    // Stable, so features declaring the same version keep their document order.
    features.sort_by_key(|&(version, _)| version);

    for (feature_version, feature) in features {
        trace!("applying feature {} ({})", feature.attribute("name").map_or("", |n| n.as_str()), feature_version);

        for block in feature.child_elements() {
            let required = match block.name.as_str() {
                "require" => true,
                "remove" => false,
                _ => continue,
            };

            if let Some(block_profile) = block.attribute("profile") {
                match block_profile.parse::<Profile>() {
                    Ok(block_profile) if block_profile == profile => {},
                    Ok(_) => continue,
                    Err(err) => {
                        warn!("skipping <{}> at byte {}: {}", block.name, block.name.offset(), err);
                        continue;
                    },
                }
            }

            register(&mut requirements, block, required);
        }
    }

    debug!(
        "resolved {} entries ({} required) for {} {} ({})",
        requirements.len(),
        requirements.required().count(),
        api,
        version,
        profile
    );
    requirements
}

/// The version `feature` declares, if it belongs to `api` and is not newer than `max_version`.
fn applicable_version(feature: &Element, api: Api, max_version: Version) -> Option<Version> {
    let feature_api = match feature.attribute("api") {
        Some(feature_api) => feature_api,
        None => {
            warn!("expected attribute `api` on <feature> at byte {}", feature.name.offset());
            return None;
        },
    };
    match feature_api.parse::<Api>() {
        Ok(feature_api) if feature_api == api => {},
        Ok(_) => return None,
        Err(err) => {
            warn!("skipping <feature> at byte {}: {}", feature.name.offset(), err);
            return None;
        },
    }

    let name = match feature.attribute("name") {
        Some(name) => name,
        None => {
            warn!("expected attribute `name` on <feature> at byte {}", feature.name.offset());
            return None;
        },
    };
    match Version::from_feature_name(&name) {
        Ok(version) if version <= max_version => Some(version),
        Ok(_) => None,
        Err(err) => {
            warn!("skipping <feature> at byte {}: {}", name.offset(), err);
            None
        },
    }
}

fn register<'a>(requirements: &mut RequirementSet<'a>, block: &Element<'a>, required: bool) {
    for reference in block.child_elements() {
        let kind = match RequirementKind::from_tag(&reference.name) {
            Some(kind) => kind,
            None => continue,
        };

        match reference.attribute("name") {
            Some(name) => requirements.insert(kind, name, required),
            None => warn!("expected attribute `name` on <{}> at byte {}", reference.name, reference.name.offset()),
        }
    }
}
