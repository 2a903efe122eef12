//! Schemas of the documents Stackwright reads.

use super::{Field, Shape};

/// Lifecycle command types accepted in command descriptors.
const COMMAND_TYPES: &[&str] = &["install", "uninstall", "update", "configure", "verify"];

/// Package groups: either a plain list of names or a list of manager groups.
fn packages_shape() -> Shape {
    Shape::OneOf(vec![
        Shape::list(Shape::Str),
        Shape::list(Shape::map(vec![
            Field::required("packages", Shape::list(Shape::Str)),
            Field::optional("manager", Shape::Str),
            Field::optional("dependency", Shape::Str),
            Field::optional("install_command", Shape::Str),
        ])),
    ])
}

/// Schema of an environment manifest.
pub fn environment_shape() -> Shape {
    let platform = Shape::map(vec![
        Field::optional(
            "os",
            Shape::OneOf(vec![Shape::Str, Shape::list(Shape::Str)]),
        ),
        Field::optional(
            "env",
            Shape::list(Shape::map(vec![
                Field::required("name", Shape::Str),
                Field::required("value", Shape::Str),
            ])),
        ),
        Field::optional("packages", packages_shape()),
        Field::optional(
            "images",
            Shape::list(Shape::map(vec![
                Field::required("id", Shape::Str),
                Field::optional("packages", packages_shape()),
            ])),
        ),
    ]);

    let component = Shape::map(vec![
        Field::required("name", Shape::Str),
        Field::optional("purpose", Shape::Str),
        Field::optional("version", Shape::Str),
    ]);

    Shape::map(vec![Field::required(
        "environment",
        Shape::map(vec![
            Field::required("name", Shape::Str),
            Field::optional("description", Shape::Str),
            Field::optional("platform", platform),
            Field::required("components", Shape::list(component)),
        ]),
    )])
}

/// Schema of a declarative command descriptor.
pub fn command_descriptor_shape() -> Shape {
    Shape::map(vec![Field::required(
        "command",
        Shape::map(vec![
            Field::required("type", Shape::Enum(COMMAND_TYPES.to_vec())),
            Field::required("provider", Shape::Str),
            Field::optional("configuration", Shape::AnyMap),
        ]),
    )])
}

/// Schema of a descriptor binding a folder to a compiled-in component plugin.
pub fn plugin_descriptor_shape() -> Shape {
    Shape::map(vec![Field::required(
        "component",
        Shape::map(vec![
            Field::required("plugin", Shape::Str),
            Field::optional("description", Shape::Str),
        ]),
    )])
}

/// Schema of a `.stackwright.yml` configuration file.
///
/// Unknown keys are tolerated here and reported by the loader.
pub fn configuration_shape() -> Shape {
    Shape::Map {
        fields: vec![
            Field::optional("verbosity", Shape::Int),
            Field::optional("search_paths", Shape::list(Shape::Str)),
            Field::optional("component_search_paths", Shape::list(Shape::Str)),
            Field::optional("environment_search_paths", Shape::list(Shape::Str)),
        ],
        allow_unknown: true,
    }
}
