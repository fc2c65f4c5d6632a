use fractalscope_core::FractalKind;
use fractalscope_render::{PaletteKind, ViewEvent};

use crate::error::AppError;

/// Cursor used by zoom events that do not name one: the view centre.
const CENTER_UV: (f64, f64) = (0.5, 0.5);

/// Translate one command-line token into the view events it stands for.
///
/// | token | events |
/// |---|---|
/// | `zoom-in[@u,v]`, `zoom-out[@u,v]` | zoom about `(u, v)` or the centre |
/// | `pan:du,dv` | a complete drag: start plus one move |
/// | `palette` / `palette:<name>` | cycle / select a palette |
/// | `set:<kind>` | select the fractal family |
/// | `back`, `reset` | history navigation |
pub fn parse_event(token: &str) -> Result<Vec<ViewEvent>, AppError> {
    let (name, arg) = match token.split_once(['@', ':']) {
        Some((name, arg)) => (name, Some(arg)),
        None => (token, None),
    };

    let events = match (name, arg) {
        ("zoom-in", arg) => vec![ViewEvent::ZoomIn {
            cursor: Some(cursor(token, arg)?),
        }],
        ("zoom-out", arg) => vec![ViewEvent::ZoomOut {
            cursor: Some(cursor(token, arg)?),
        }],
        ("pan", Some(arg)) => {
            let (du, dv) = pair(token, arg)?;
            vec![ViewEvent::BeginPan, ViewEvent::Pan { du, dv }]
        }
        ("palette", None) => vec![ViewEvent::CyclePalette],
        ("palette", Some(arg)) => vec![ViewEvent::SelectPalette(arg.parse::<PaletteKind>()?)],
        ("set", Some(arg)) => vec![ViewEvent::SelectKind(arg.parse::<FractalKind>()?)],
        ("back", None) => vec![ViewEvent::GoBack],
        ("reset", None) => vec![ViewEvent::Reset],
        _ => return Err(AppError::UnknownEvent(token.to_string())),
    };
    Ok(events)
}

fn cursor(token: &str, arg: Option<&str>) -> Result<(f64, f64), AppError> {
    let Some(arg) = arg else {
        return Ok(CENTER_UV);
    };
    let uv = pair(token, arg)?;
    if !(0.0..=1.0).contains(&uv.0) || !(0.0..=1.0).contains(&uv.1) {
        return Err(malformed(token, "cursor must lie in [0, 1]²"));
    }
    Ok(uv)
}

fn pair(token: &str, arg: &str) -> Result<(f64, f64), AppError> {
    let (a, b) = arg
        .split_once(',')
        .ok_or_else(|| malformed(token, "expected two comma-separated numbers"))?;
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| malformed(token, &format!("{s:?} is not a finite number")))
    };
    Ok((parse(a)?, parse(b)?))
}

fn malformed(token: &str, reason: &str) -> AppError {
    AppError::MalformedEvent {
        event: token.to_string(),
        reason: reason.to_string(),
    }
}
