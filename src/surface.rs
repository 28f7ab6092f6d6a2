//! Lays out a [`FormView`] with gpui. Widgets themselves are produced by the
//! caller, one element per visible field.

use gpui::{
    AnyElement, App, Div, IntoElement, ParentElement, RenderOnce, SharedString, Styled, Window,
    div, px, relative,
};

use crate::form::{
    BannerKind, FieldView, FormLayout, FormView, MemberWidth, RenderedRow, WidgetSet,
};

type WidgetBuilder = Box<dyn FnMut(&FieldView) -> AnyElement>;
type BannerBuilder = Box<dyn FnOnce(BannerKind, SharedString) -> AnyElement>;

struct ElementWidgets<'a> {
    build: &'a mut WidgetBuilder,
}

impl WidgetSet for ElementWidgets<'_> {
    type Output = AnyElement;

    fn widget(&mut self, field: &FieldView) -> AnyElement {
        (self.build)(field)
    }
}

#[derive(IntoElement)]
pub struct FormSurface {
    view: FormView,
    build: WidgetBuilder,
    banner: Option<BannerBuilder>,
    footer: Vec<AnyElement>,
}

impl FormSurface {
    pub fn new(
        view: FormView,
        build: impl FnMut(&FieldView) -> AnyElement + 'static,
    ) -> Self {
        Self {
            view,
            build: Box::new(build),
            banner: None,
            footer: Vec::new(),
        }
    }

    /// Overrides how the success or error banner is drawn.
    pub fn banner(
        mut self,
        render: impl FnOnce(BannerKind, SharedString) -> AnyElement + 'static,
    ) -> Self {
        self.banner = Some(Box::new(render));
        self
    }

    /// Elements placed after the fields, typically the submit button.
    pub fn footer(mut self, content: impl IntoElement) -> Self {
        self.footer.push(content.into_any_element());
        self
    }

    fn row_container(layout: FormLayout, gap: f32) -> Div {
        let root = div().w_full().flex().gap(px(gap));
        match layout {
            FormLayout::Vertical => root.flex_col(),
            FormLayout::Horizontal | FormLayout::Grid { .. } => root.flex_row().flex_wrap(),
        }
    }

    fn cell(layout: FormLayout, content: AnyElement) -> AnyElement {
        match layout {
            FormLayout::Grid { columns } => div()
                .w(relative(1.0 / columns.max(1) as f32))
                .child(content)
                .into_any_element(),
            FormLayout::Horizontal => div().flex_1().child(content).into_any_element(),
            FormLayout::Vertical => content,
        }
    }

    fn group(gap: f32, members: Vec<(MemberWidth, AnyElement)>) -> AnyElement {
        div()
            .w_full()
            .flex()
            .flex_row()
            .gap(px(gap))
            .children(members.into_iter().map(|(width, member)| {
                let cell = div().flex_shrink();
                match width {
                    MemberWidth::Fraction(fraction) => cell.w(relative(fraction)),
                    MemberWidth::Px(width) => cell.w(px(width)),
                }
                .child(member)
            }))
            .into_any_element()
    }

    fn default_banner(kind: BannerKind, message: SharedString) -> AnyElement {
        let color = match kind {
            BannerKind::Success => gpui::rgb(0x2b8a3e),
            BannerKind::Error => gpui::rgb(0xc92a2a),
        };
        div()
            .w_full()
            .px_3()
            .py_2()
            .rounded_md()
            .border_1()
            .border_color(color)
            .text_color(color)
            .child(message)
            .into_any_element()
    }
}

impl RenderOnce for FormSurface {
    fn render(mut self, _window: &mut Window, _cx: &mut App) -> impl IntoElement {
        let layout = self.view.layout;
        let gap = self.view.gap.px();
        let rows = self.view.render_with(&mut ElementWidgets {
            build: &mut self.build,
        });

        let fields = Self::row_container(layout, gap).children(rows.into_iter().map(|row| {
            match row {
                RenderedRow::Single(element) => Self::cell(layout, element),
                RenderedRow::Group { members, .. } => Self::group(gap, members),
            }
        }));

        let banner = self.view.banner.as_ref().map(|banner| {
            let message = SharedString::from(banner.message.clone());
            match self.banner.take() {
                Some(render) => render(banner.kind, message),
                None => Self::default_banner(banner.kind, message),
            }
        });

        div()
            .w_full()
            .flex()
            .flex_col()
            .gap(px(gap))
            .children(banner)
            .child(fields)
            .children(self.footer)
    }
}
