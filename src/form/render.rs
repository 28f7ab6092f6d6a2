use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::config::{FormConfig, FormLayout, Gap};
use super::definition::FormDefinition;
use super::field::{ChoiceOption, FieldKind, FieldSchema, FieldWidth, InputType, WidgetVariant};
use super::state::{Banner, FormState};
use super::value::FieldValue;
use super::visibility::visible_fields;

/// The widget a field renders as. Unknown field kinds have no widget.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Widget {
    TextInput {
        input_type: InputType,
    },
    NumberInput {
        min: Option<Decimal>,
        max: Option<Decimal>,
        step: Option<Decimal>,
    },
    Textarea {
        rows: u16,
    },
    Checkbox,
    Switch,
    Select {
        options: Vec<ChoiceOption>,
    },
    RadioGroup {
        options: Vec<ChoiceOption>,
    },
    DatePicker {
        min: Option<NaiveDate>,
        max: Option<NaiveDate>,
    },
    FileInput {
        accept: Vec<String>,
        multiple: bool,
    },
}

impl Widget {
    pub fn for_kind(kind: &FieldKind) -> Option<Self> {
        let widget = match kind {
            FieldKind::Input(input_type) => Widget::TextInput {
                input_type: *input_type,
            },
            FieldKind::Number { min, max, step } => Widget::NumberInput {
                min: *min,
                max: *max,
                step: *step,
            },
            FieldKind::Textarea { rows } => Widget::Textarea { rows: *rows },
            FieldKind::Checkbox => Widget::Checkbox,
            FieldKind::Switch => Widget::Switch,
            FieldKind::Select { options } => Widget::Select {
                options: options.clone(),
            },
            FieldKind::Radio { options } => Widget::RadioGroup {
                options: options.clone(),
            },
            FieldKind::Date { min, max } => Widget::DatePicker {
                min: *min,
                max: *max,
            },
            FieldKind::File { accept, multiple } => Widget::FileInput {
                accept: accept.clone(),
                multiple: *multiple,
            },
            FieldKind::Unknown(_) => return None,
        };
        Some(widget)
    }
}

/// Props handed to one input widget.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldView {
    pub name: String,
    pub label: String,
    pub description: Option<String>,
    pub placeholder: Option<String>,
    pub widget: Widget,
    pub value: FieldValue,
    pub error: Option<String>,
    pub required: bool,
    pub disabled: bool,
    pub variant: WidgetVariant,
}

/// Resolved width of a group member.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MemberWidth {
    Fraction(f32),
    Px(f32),
}

#[derive(Clone, Debug, PartialEq)]
pub struct GroupMember {
    pub width: MemberWidth,
    pub field: FieldView,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RowView {
    Field(FieldView),
    Group {
        key: String,
        members: Vec<GroupMember>,
    },
}

impl RowView {
    pub fn field_names(&self) -> Vec<&str> {
        match self {
            RowView::Field(field) => vec![field.name.as_str()],
            RowView::Group { members, .. } => members
                .iter()
                .map(|member| member.field.name.as_str())
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FormView {
    pub layout: FormLayout,
    pub gap: Gap,
    pub rows: Vec<RowView>,
    pub banner: Option<Banner>,
    pub submit_disabled: bool,
}

impl FormView {
    pub fn field(&self, name: &str) -> Option<&FieldView> {
        self.rows.iter().find_map(|row| match row {
            RowView::Field(field) => (field.name == name).then_some(field),
            RowView::Group { members, .. } => members
                .iter()
                .find(|member| member.field.name == name)
                .map(|member| &member.field),
        })
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.rows.iter().flat_map(RowView::field_names).collect()
    }

    /// Maps every field through `widgets`, keeping the row structure.
    pub fn render_with<W>(&self, widgets: &mut W) -> Vec<RenderedRow<W::Output>>
    where
        W: WidgetSet,
    {
        self.rows
            .iter()
            .map(|row| match row {
                RowView::Field(field) => RenderedRow::Single(widgets.widget(field)),
                RowView::Group { key, members } => RenderedRow::Group {
                    key: key.clone(),
                    members: members
                        .iter()
                        .map(|member| (member.width, widgets.widget(&member.field)))
                        .collect(),
                },
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum RenderedRow<T> {
    Single(T),
    Group {
        key: String,
        members: Vec<(MemberWidth, T)>,
    },
}

/// Pre-built input widgets, one per [`Widget`] variant. Implementations
/// receive the controlled value, error and disabled flag through the view
/// and report edits back through the form controller.
pub trait WidgetSet {
    type Output;

    fn widget(&mut self, field: &FieldView) -> Self::Output;
}

pub fn render(definition: &FormDefinition, state: &FormState, config: &FormConfig) -> FormView {
    let visible = visible_fields(definition.fields(), state.values());
    let mut rows = Vec::new();
    let mut emitted_groups = Vec::<&str>::new();

    for field in &visible {
        match field.group.as_deref() {
            None => {
                if let Some(view) = field_view(field, state, config) {
                    rows.push(RowView::Field(view));
                }
            }
            Some(group) if emitted_groups.contains(&group) => {}
            Some(group) => {
                emitted_groups.push(group);
                let members = visible
                    .iter()
                    .filter(|member| member.group.as_deref() == Some(group))
                    .filter_map(|member| {
                        field_view(member, state, config).map(|view| (member.width, view))
                    })
                    .collect::<Vec<_>>();
                if members.is_empty() {
                    continue;
                }
                rows.push(RowView::Group {
                    key: group.to_string(),
                    members: resolve_widths(members),
                });
            }
        }
    }

    FormView {
        layout: config.layout,
        gap: match config.layout {
            FormLayout::Grid { .. } => config.gap,
            FormLayout::Vertical | FormLayout::Horizontal => Gap::default(),
        },
        rows,
        banner: state.banner(config),
        submit_disabled: state.in_flight(),
    }
}

fn field_view(field: &FieldSchema, state: &FormState, config: &FormConfig) -> Option<FieldView> {
    let Some(widget) = Widget::for_kind(&field.kind) else {
        tracing::warn!(
            field = %field.name,
            kind = ?field.kind,
            "skipping field with unrecognized type"
        );
        return None;
    };
    let value = state
        .values()
        .get(&field.name)
        .filter(|value| field.accepts(value))
        .cloned()
        .or_else(|| field.initial_value())?;

    Some(FieldView {
        name: field.name.clone(),
        label: field.label.clone(),
        description: field.description.clone(),
        placeholder: field.placeholder.clone(),
        widget,
        value,
        error: state.display_error(&field.name).map(str::to_string),
        required: field.required,
        disabled: field.disabled,
        variant: field.variant.unwrap_or(config.variant),
    })
}

/// Explicit widths are kept; `Auto` members split the fraction the
/// explicit fractions leave over.
fn resolve_widths(members: Vec<(FieldWidth, FieldView)>) -> Vec<GroupMember> {
    let claimed = members
        .iter()
        .map(|(width, _)| match width {
            FieldWidth::Fraction(fraction) => fraction.max(0.0),
            FieldWidth::Auto | FieldWidth::Px(_) => 0.0,
        })
        .sum::<f32>();
    let auto_count = members
        .iter()
        .filter(|(width, _)| *width == FieldWidth::Auto)
        .count();
    let share = if auto_count == 0 {
        0.0
    } else {
        (1.0 - claimed).max(0.0) / auto_count as f32
    };

    members
        .into_iter()
        .map(|(width, field)| GroupMember {
            width: match width {
                FieldWidth::Auto => MemberWidth::Fraction(share),
                FieldWidth::Fraction(fraction) => MemberWidth::Fraction(fraction.max(0.0)),
                FieldWidth::Px(px) => MemberWidth::Px(px.max(0.0)),
            },
            field,
        })
        .collect()
}
