use inform_client::format::{Fragment, Inline, Node};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use super::layout::{PopupLayout, PromptLayout, SEND_LABEL, ScreenLayout, trigger_label};
use super::prompt::PromptVariant;
use super::state::AppState;
use super::theme::{Meaning, Theme};
use super::view_model::{
    Body, Entry, FAQ_TITLE, FaqItem, Gauge, ModeOption, Screen, THINKING_TEXT, TITLE, USER_TITLE,
};

/// Cells in the confidence bar.
const GAUGE_WIDTH: usize = 20;
const ASSISTANT_TITLE: &str = "InForm";
const POPUP_TITLE: &str = "Answer mode";

pub struct RenderContext<'a> {
    pub theme: &'a Theme,
}

/// Main render function: derives layout and view model from state, then
/// draws them.
pub fn render(frame: &mut Frame, state: &AppState, ctx: &RenderContext) {
    let layout = ScreenLayout::compute(frame.area(), state);
    let screen = Screen::from_state(state);

    match &screen.body {
        Body::Landing { hero_lines, faq } => {
            if let Some(area) = layout.hero {
                render_hero(frame, hero_lines, area, ctx);
            }
            if let Some(area) = layout.faq {
                render_faq(frame, faq, area, ctx);
            }
        }
        Body::Chat { entries } => {
            if let Some(area) = layout.transcript {
                render_transcript(frame, entries, area, state.scroll_from_bottom, ctx);
            }
        }
    }

    render_prompt(frame, state, &screen, &layout.prompt, ctx);

    frame.render_widget(
        Paragraph::new(screen.footer).style(ctx.theme.as_style(Meaning::Muted)),
        layout.footer,
    );

    // Drawn last so it sits above everything else
    if let (Some(options), Some(popup)) = (&screen.mode_options, &layout.mode_popup) {
        render_mode_popup(frame, options, popup, ctx);
    }
}

fn render_hero(frame: &mut Frame, lines: &[&'static str], area: Rect, ctx: &RenderContext) {
    let mut text = vec![
        Line::from(Span::styled(TITLE, ctx.theme.as_style(Meaning::Title))),
        Line::default(),
    ];
    text.extend(
        lines
            .iter()
            .map(|l| Line::from(Span::styled(*l, ctx.theme.as_style(Meaning::Annotation)))),
    );

    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_faq(frame: &mut Frame, items: &[FaqItem], area: Rect, ctx: &RenderContext) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(ctx.theme.as_style(Meaning::Muted))
        .title(Span::styled(FAQ_TITLE, ctx.theme.as_style(Meaning::Guidance)));

    let lines: Vec<Line> = items
        .iter()
        .map(|item| {
            let (marker, style) = if item.selected {
                ("› ", ctx.theme.as_style(Meaning::Selected))
            } else {
                ("  ", ctx.theme.as_style(Meaning::Base))
            };
            Line::from(vec![Span::raw(marker), Span::raw(item.text)]).style(style)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_transcript(
    frame: &mut Frame,
    entries: &[Entry],
    area: Rect,
    scroll_from_bottom: u16,
    ctx: &RenderContext,
) {
    let paragraph = transcript_paragraph(entries, ctx.theme);

    // Pin to the bottom, then back off by however far the user scrolled up
    let offset = max_scroll(&paragraph, area).saturating_sub(scroll_from_bottom);

    frame.render_widget(paragraph.scroll((offset, 0)), area);
}

/// Furthest the transcript can scroll up from the bottom in `area`.
pub fn transcript_max_scroll(entries: &[Entry], area: Rect) -> u16 {
    // Wrapping does not depend on styling
    max_scroll(&transcript_paragraph(entries, &Theme::default()), area)
}

fn transcript_paragraph(entries: &[Entry], theme: &Theme) -> Paragraph<'static> {
    let mut lines = Vec::new();
    for (idx, entry) in entries.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::default());
        }
        lines.extend(entry_lines(entry, theme));
    }

    Paragraph::new(lines).wrap(Wrap { trim: false })
}

fn max_scroll(paragraph: &Paragraph, area: Rect) -> u16 {
    let total = u16::try_from(paragraph.line_count(area.width)).unwrap_or(u16::MAX);
    total.saturating_sub(area.height)
}

fn entry_lines(entry: &Entry, theme: &Theme) -> Vec<Line<'static>> {
    match entry {
        Entry::User { content } => {
            let mut lines = vec![Line::from(Span::styled(
                USER_TITLE,
                theme.as_style(Meaning::Guidance).add_modifier(Modifier::BOLD),
            ))];
            lines.extend(
                content
                    .split('\n')
                    .map(|l| Line::from(Span::styled(l.to_string(), theme.as_style(Meaning::Base)))),
            );
            lines
        }
        Entry::Assistant { gauge, blocks } => {
            let mut lines = vec![Line::from(Span::styled(
                ASSISTANT_TITLE,
                theme.as_style(Meaning::Important).add_modifier(Modifier::BOLD),
            ))];
            if let Some(gauge) = gauge {
                lines.push(gauge_line(gauge, theme));
            }
            for (idx, block) in blocks.iter().enumerate() {
                if idx > 0 {
                    lines.push(Line::default());
                }
                lines.extend(fragment_lines(block, theme));
            }
            lines
        }
        Entry::Thinking { frame } => vec![Line::from(vec![
            Span::styled(format!("{frame} "), theme.as_style(Meaning::Guidance)),
            Span::styled(THINKING_TEXT, theme.as_style(Meaning::Annotation)),
        ])],
    }
}

fn gauge_line(gauge: &Gauge, theme: &Theme) -> Line<'static> {
    let filled = ((gauge.percent / 100.0) * GAUGE_WIDTH as f64).round() as usize;
    let filled = filled.min(GAUGE_WIDTH);
    let style = theme.confidence_style(gauge.label);

    Line::from(vec![
        Span::styled("█".repeat(filled), style),
        Span::styled(
            "░".repeat(GAUGE_WIDTH - filled),
            theme.as_style(Meaning::Muted),
        ),
        Span::raw(" "),
        Span::styled(gauge.text.clone(), style),
        Span::styled(
            format!(" ({})", gauge.label.as_str()),
            theme.as_style(Meaning::Muted),
        ),
    ])
}

/// Lay out a formatted answer block as terminal lines: strong runs in bold,
/// list items behind a bullet, blank lines kept.
pub fn fragment_lines(fragment: &Fragment, theme: &Theme) -> Vec<Line<'static>> {
    let base = theme.as_style(Meaning::Base);
    let mut lines = Vec::new();

    for node in &fragment.nodes {
        match node {
            Node::Paragraph(runs) => lines.push(Line::from(inline_spans(runs, base))),
            Node::List(items) => {
                for item in items {
                    let mut spans = vec![Span::styled("• ", theme.as_style(Meaning::Guidance))];
                    spans.extend(inline_spans(item, base));
                    lines.push(Line::from(spans));
                }
            }
            Node::Break => lines.push(Line::default()),
        }
    }

    lines
}

fn inline_spans(runs: &[Inline], base: Style) -> Vec<Span<'static>> {
    runs.iter()
        .map(|run| match run {
            Inline::Plain(text) => Span::styled(text.clone(), base),
            Inline::Strong(text) => Span::styled(text.clone(), base.add_modifier(Modifier::BOLD)),
        })
        .collect()
}

fn render_prompt(
    frame: &mut Frame,
    state: &AppState,
    screen: &Screen,
    layout: &PromptLayout,
    ctx: &RenderContext,
) {
    let border = if screen.mode_options.is_some() {
        ctx.theme.as_style(Meaning::Muted)
    } else {
        ctx.theme.as_style(Meaning::Guidance)
    };
    // Heavier frame on the landing screen
    let border_type = match screen.prompt_variant {
        PromptVariant::Hero => BorderType::Thick,
        PromptVariant::Chat => BorderType::Rounded,
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border);
    frame.render_widget(block, layout.block);

    frame.render_widget(state.prompt.textarea(), layout.text);

    frame.render_widget(
        Paragraph::new(Span::styled(
            trigger_label(screen.mode),
            ctx.theme.as_style(Meaning::Guidance),
        )),
        layout.mode_trigger,
    );

    // Tagline fills the gap between the trigger and the send button
    let tagline_x = layout.mode_trigger.right().saturating_add(1);
    let tagline = Rect {
        x: tagline_x,
        width: layout.send.x.saturating_sub(tagline_x).saturating_sub(1),
        ..layout.mode_trigger
    };
    if tagline.width > 0 {
        frame.render_widget(
            Paragraph::new(Span::styled(
                screen.mode.tagline(),
                ctx.theme.as_style(Meaning::Muted),
            )),
            tagline,
        );
    }

    let send_style = if state.prompt.is_blank() {
        ctx.theme.as_style(Meaning::Muted)
    } else {
        ctx.theme.as_style(Meaning::Important).add_modifier(Modifier::BOLD)
    };
    frame.render_widget(
        Paragraph::new(Span::styled(SEND_LABEL, send_style)),
        layout.send,
    );
}

fn render_mode_popup(
    frame: &mut Frame,
    options: &[ModeOption],
    popup: &PopupLayout,
    ctx: &RenderContext,
) {
    frame.render_widget(Clear, popup.area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(ctx.theme.as_style(Meaning::Guidance));
    // Title on the edge facing the trigger
    let block = if popup.opens_upward {
        block.title_bottom(POPUP_TITLE)
    } else {
        block.title(POPUP_TITLE)
    };
    frame.render_widget(block, popup.area);

    for (option, (_, area)) in options.iter().zip(&popup.options) {
        let marker = if option.current { "● " } else { "  " };
        let mut label_style = ctx.theme.as_style(Meaning::Title);
        let mut tagline_style = ctx.theme.as_style(Meaning::Muted);
        if option.highlighted {
            label_style = label_style.patch(ctx.theme.as_style(Meaning::Selected));
            tagline_style = tagline_style.patch(ctx.theme.as_style(Meaning::Selected));
        }

        let lines = vec![
            Line::from(vec![Span::raw(marker), Span::raw(option.label)]).style(label_style),
            Line::from(vec![Span::raw("  "), Span::raw(option.tagline)]).style(tagline_style),
        ];
        frame.render_widget(Paragraph::new(lines), *area);
    }
}
