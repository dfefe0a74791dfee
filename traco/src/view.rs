//! Headless widget tree.
//!
//! Forms render to a tree of [`Node`]s. Interactive nodes carry their own callbacks; a host
//! renders the tree, and feeds user events back by calling [`Input::input`], [`Button::click`],
//! etc. The tree is rebuilt from the current state after every change.
use std::{fmt, rc::Rc};
use tracing::trace;

/// Text field.
#[derive(Clone)]
pub struct Input {
    pub name: String,
    pub value: String,
    pub placeholder: String,
    on_value_changed: Option<Rc<dyn Fn(String)>>,
    on_focus_changed: Option<Rc<dyn Fn(bool)>>,
}

impl Input {
    pub fn new(name: &str, value: impl Into<String>) -> Input {
        Input {
            name: name.to_string(),
            value: value.into(),
            placeholder: String::new(),
            on_value_changed: None,
            on_focus_changed: None,
        }
    }

    /// Numeric field. Empty text reads as zero; text that doesn't parse as a finite number is
    /// ignored.
    pub fn number(name: &str, value: f64, on_value_changed: impl Fn(f64) + 'static) -> Input {
        let name_owned = name.to_string();
        Input::new(name, format_number(value)).on_value_changed(move |text: String| {
            match parse_number(&text) {
                Some(value) => on_value_changed(value),
                None => trace!(field = %name_owned, text = %text, "ignoring non-numeric input"),
            }
        })
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn on_value_changed(mut self, f: impl Fn(String) + 'static) -> Self {
        self.on_value_changed = Some(Rc::new(f));
        self
    }

    pub fn on_focus_changed(mut self, f: impl Fn(bool) + 'static) -> Self {
        self.on_focus_changed = Some(Rc::new(f));
        self
    }

    /// Simulates the user replacing the text of the field.
    pub fn input(&self, text: &str) {
        if let Some(f) = &self.on_value_changed {
            f(text.to_string())
        }
    }

    pub fn focus(&self, focused: bool) {
        if let Some(f) = &self.on_focus_changed {
            f(focused)
        }
    }
}

/// Parses the contents of a numeric field.
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Some(0.0);
    }
    text.parse::<f64>().ok().filter(|x| x.is_finite())
}

fn format_number(value: f64) -> String {
    format!("{value}")
}

#[derive(Clone)]
pub struct Button {
    pub label: String,
    pub enabled: bool,
    on_click: Rc<dyn Fn()>,
}

impl Button {
    pub fn new(label: &str, on_click: impl Fn() + 'static) -> Button {
        Button {
            label: label.to_string(),
            enabled: true,
            on_click: Rc::new(on_click),
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Clicks the button. Disabled buttons ignore clicks.
    pub fn click(&self) {
        if self.enabled {
            (self.on_click)()
        } else {
            trace!(label = %self.label, "click on disabled button");
        }
    }
}

#[derive(Clone)]
pub struct Checkbox {
    pub label: String,
    pub checked: bool,
    on_toggled: Rc<dyn Fn(bool)>,
}

impl Checkbox {
    pub fn new(label: &str, checked: bool, on_toggled: impl Fn(bool) + 'static) -> Checkbox {
        Checkbox {
            label: label.to_string(),
            checked,
            on_toggled: Rc::new(on_toggled),
        }
    }

    pub fn toggle(&self) {
        (self.on_toggled)(!self.checked)
    }
}

/// Drop-down with integer-valued options.
#[derive(Clone)]
pub struct Choice {
    pub name: String,
    pub selected: i64,
    pub options: Vec<(i64, String)>,
    on_selected: Rc<dyn Fn(i64)>,
    on_focus_changed: Option<Rc<dyn Fn(bool)>>,
}

impl Choice {
    pub fn new(name: &str, selected: i64, options: Vec<(i64, String)>, on_selected: impl Fn(i64) + 'static) -> Choice {
        Choice {
            name: name.to_string(),
            selected,
            options,
            on_selected: Rc::new(on_selected),
            on_focus_changed: None,
        }
    }

    pub fn on_focus_changed(mut self, f: impl Fn(bool) + 'static) -> Self {
        self.on_focus_changed = Some(Rc::new(f));
        self
    }

    /// Selects the option with the given value. Values that are not among the options are ignored.
    pub fn choose(&self, value: i64) {
        if self.options.iter().any(|(v, _)| *v == value) {
            (self.on_selected)(value)
        } else {
            trace!(choice = %self.name, value, "no such option");
        }
    }

    pub fn focus(&self, focused: bool) {
        if let Some(f) = &self.on_focus_changed {
            f(focused)
        }
    }
}

/// Node of the widget tree.
#[derive(Clone)]
pub enum Node {
    /// Renders nothing.
    Empty,
    Spinner,
    Text(String),
    Input(Input),
    Button(Button),
    Checkbox(Checkbox),
    Choice(Choice),
    Group { class: String, children: Vec<Node> },
}

impl From<Input> for Node {
    fn from(input: Input) -> Self {
        Node::Input(input)
    }
}

impl From<Button> for Node {
    fn from(button: Button) -> Self {
        Node::Button(button)
    }
}

impl From<Checkbox> for Node {
    fn from(checkbox: Checkbox) -> Self {
        Node::Checkbox(checkbox)
    }
}

impl From<Choice> for Node {
    fn from(choice: Choice) -> Self {
        Node::Choice(choice)
    }
}

impl Node {
    pub fn text(text: impl Into<String>) -> Node {
        Node::Text(text.into())
    }

    /// Creates a group. `Empty` children are dropped.
    pub fn group(class: &str, children: Vec<Node>) -> Node {
        Node::Group {
            class: class.to_string(),
            children: children.into_iter().filter(|c| !c.is_empty()).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Node::Empty)
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Group { children, .. } => children,
            _ => &[],
        }
    }

    /// Visits this node and all its descendants, depth-first.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }

    fn find_map<'a, R>(&'a self, mut f: impl FnMut(&'a Node) -> Option<R>) -> Option<R> {
        let mut found = None;
        self.walk(&mut |node| {
            if found.is_none() {
                found = f(node);
            }
        });
        found
    }

    pub fn find_button(&self, label: &str) -> Option<&Button> {
        self.find_map(|node| match node {
            Node::Button(b) if b.label == label => Some(b),
            _ => None,
        })
    }

    /// All buttons with the given label, in tree order.
    pub fn buttons(&self, label: &str) -> Vec<&Button> {
        let mut buttons = Vec::new();
        self.walk(&mut |node| match node {
            Node::Button(b) if b.label == label => buttons.push(b),
            _ => {}
        });
        buttons
    }

    pub fn find_input(&self, name: &str) -> Option<&Input> {
        self.find_map(|node| match node {
            Node::Input(i) if i.name == name => Some(i),
            _ => None,
        })
    }

    pub fn find_choice(&self, name: &str) -> Option<&Choice> {
        self.find_map(|node| match node {
            Node::Choice(c) if c.name == name => Some(c),
            _ => None,
        })
    }

    pub fn find_checkbox(&self, label: &str) -> Option<&Checkbox> {
        self.find_map(|node| match node {
            Node::Checkbox(c) if c.label == label => Some(c),
            _ => None,
        })
    }

    /// First group with the given class.
    pub fn find_group(&self, class: &str) -> Option<&Node> {
        self.find_map(|node| match node {
            Node::Group { class: c, .. } if c == class => Some(node),
            _ => None,
        })
    }

    /// All groups with the given class, in tree order.
    pub fn groups(&self, class: &str) -> Vec<&Node> {
        let mut groups = Vec::new();
        self.walk(&mut |node| match node {
            Node::Group { class: c, .. } if c == class => groups.push(node),
            _ => {}
        });
        groups
    }

    /// All text in the tree, in order.
    pub fn texts(&self) -> Vec<&str> {
        let mut texts = Vec::new();
        self.walk(&mut |node| {
            if let Node::Text(t) = node {
                texts.push(t.as_str())
            }
        });
        texts
    }

    pub fn contains_text(&self, text: &str) -> bool {
        self.texts().iter().any(|t| t.contains(text))
    }

    pub fn contains_spinner(&self) -> bool {
        self.find_map(|node| matches!(node, Node::Spinner).then_some(())).is_some()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Node::Empty => f.write_str("Empty"),
            Node::Spinner => f.write_str("Spinner"),
            Node::Text(t) => f.debug_tuple("Text").field(t).finish(),
            Node::Input(i) => f
                .debug_struct("Input")
                .field("name", &i.name)
                .field("value", &i.value)
                .finish_non_exhaustive(),
            Node::Button(b) => f
                .debug_struct("Button")
                .field("label", &b.label)
                .field("enabled", &b.enabled)
                .finish_non_exhaustive(),
            Node::Checkbox(c) => f
                .debug_struct("Checkbox")
                .field("label", &c.label)
                .field("checked", &c.checked)
                .finish_non_exhaustive(),
            Node::Choice(c) => f
                .debug_struct("Choice")
                .field("name", &c.name)
                .field("selected", &c.selected)
                .field("options", &c.options)
                .finish_non_exhaustive(),
            Node::Group { class, children } => {
                write!(f, "{class} ")?;
                f.debug_list().entries(children).finish()
            }
        }
    }
}
