//! The composed command tree.

use crate::component::BuiltCommand;

/// A named group of built commands, e.g. `install` or `manage git`.
#[derive(Debug, Clone)]
pub struct CommandGroup {
    pub name: String,
    pub help: String,
    pub commands: Vec<BuiltCommand>,
}

impl CommandGroup {
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            commands: Vec::new(),
        }
    }

    pub fn find(&self, name: &str) -> Option<&BuiltCommand> {
        self.commands.iter().find(|c| c.name() == name)
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// A node of the command tree handed to the CLI.
#[derive(Debug, Clone)]
pub enum CommandNode {
    Group {
        name: String,
        help: String,
        children: Vec<CommandNode>,
    },
    Command(BuiltCommand),
}

impl CommandNode {
    pub fn name(&self) -> &str {
        match self {
            CommandNode::Group { name, .. } => name,
            CommandNode::Command(command) => command.name(),
        }
    }

    pub fn help(&self) -> &str {
        match self {
            CommandNode::Group { help, .. } => help,
            CommandNode::Command(command) => command.help(),
        }
    }

    pub fn children(&self) -> &[CommandNode] {
        match self {
            CommandNode::Group { children, .. } => children,
            CommandNode::Command(_) => &[],
        }
    }

    /// Follow `path` down from this node's children.
    pub fn resolve<'n>(nodes: &'n [CommandNode], path: &[&str]) -> Option<&'n CommandNode> {
        let (first, rest) = path.split_first()?;
        let node = nodes.iter().find(|n| n.name() == *first)?;
        if rest.is_empty() {
            Some(node)
        } else {
            Self::resolve(node.children(), rest)
        }
    }
}

impl From<&CommandGroup> for CommandNode {
    fn from(group: &CommandGroup) -> Self {
        CommandNode::Group {
            name: group.name.clone(),
            help: group.help.clone(),
            children: group
                .commands
                .iter()
                .cloned()
                .map(CommandNode::Command)
                .collect(),
        }
    }
}
