use super::{Driver, Locator, Selector};
use crate::{Error, Result};
use eoka::Page;
use std::sync::atomic::{AtomicU64, Ordering};

/// Attribute used to hand a resolved element to eoka's CSS-based actions.
const MARK_ATTR: &str = "data-shopcheck";

static NEXT_MARK: AtomicU64 = AtomicU64::new(1);

/// Wrap `body` in a script where `all` holds every match of the locator's
/// selector and `el` the addressed one (or null).
fn script(locator: &Locator, body: &str) -> Result<String> {
    let (kind, value) = locator.selector.parts();
    Ok(format!(
        r#"(() => {{
            const kind = {kind};
            const value = {value};
            const find = () => {{
                if (kind === 'css') return Array.from(document.querySelectorAll(value));
                if (kind === 'xpath') {{
                    const r = document.evaluate(value, document, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
                    const out = [];
                    for (let i = 0; i < r.snapshotLength; i++) out.push(r.snapshotItem(i));
                    return out;
                }}
                const want = value.trim().toLowerCase();
                const same = n => (n.textContent || '').trim().toLowerCase() === want;
                return Array.from(document.querySelectorAll('body *'))
                    .filter(n => same(n) && !Array.from(n.children).some(same));
            }};
            const all = find();
            const el = all[{nth}] || null;
            {body}
        }})()"#,
        kind = serde_json::to_string(kind)?,
        value = serde_json::to_string(value)?,
        nth = locator.nth,
        body = body,
    ))
}

const VISIBLE_JS: &str = r#"
    if (!el) return false;
    const style = getComputedStyle(el);
    const rect = el.getBoundingClientRect();
    return style.visibility !== 'hidden' && style.display !== 'none'
        && rect.width > 0 && rect.height > 0;
"#;

const CENTER_JS: &str = r#"
    if (!el) return null;
    el.scrollIntoView({block: 'center'});
    const rect = el.getBoundingClientRect();
    return { x: rect.x + rect.width / 2, y: rect.y + rect.height / 2 };
"#;

/// Scroll `el` into view and name whatever sits on top of its center.
/// `''` when the pointer would reach `el` itself.
const HIT_TEST_JS: &str = r#"
    if (!el) return null;
    el.scrollIntoView({block: 'center', inline: 'center'});
    const rect = el.getBoundingClientRect();
    const top = document.elementFromPoint(rect.x + rect.width / 2, rect.y + rect.height / 2);
    if (!top || top === el || el.contains(top)) return '';
    let name = top.tagName.toLowerCase();
    if (top.id) name += '#' + top.id;
    if (typeof top.className === 'string' && top.className.trim()) {
        name += '.' + top.className.trim().split(/\s+/).join('.');
    }
    return name;
"#;

fn not_found(locator: &Locator) -> Error {
    Error::Browser(eoka::Error::ElementNotFound(locator.to_string()))
}

/// Tag the element with a unique attribute and return a CSS selector for it.
async fn mark(page: &Page, locator: &Locator) -> Result<String> {
    let id = NEXT_MARK.fetch_add(1, Ordering::Relaxed);
    let body = format!(
        "if (!el) return null; el.setAttribute('{attr}', '{id}'); return '[{attr}=\"{id}\"]';",
        attr = MARK_ATTR,
        id = id
    );
    let css: Option<String> = page.evaluate(&script(locator, &body)?).await?;
    css.ok_or_else(|| not_found(locator))
}

impl Driver for Page {
    async fn goto(&self, url: &str) -> Result<()> {
        Page::goto(self, url).await?;
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        Page::reload(self).await?;
        Ok(())
    }

    async fn url(&self) -> Result<String> {
        Ok(Page::url(self).await?)
    }

    async fn title(&self) -> Result<String> {
        Ok(Page::title(self).await?)
    }

    async fn body_text(&self) -> Result<String> {
        Ok(Page::text(self).await?)
    }

    async fn count(&self, selector: &Selector) -> Result<usize> {
        let js = script(&selector.first(), "return all.length;")?;
        Ok(self.evaluate(&js).await?)
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool> {
        Ok(self.evaluate(&script(locator, VISIBLE_JS)?).await?)
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        let top: Option<String> = self.evaluate(&script(locator, HIT_TEST_JS)?).await?;
        match top.as_deref() {
            None => return Err(not_found(locator)),
            Some("") => {}
            Some(other) => {
                return Err(Error::Browser(eoka::Error::CdpSimple(format!(
                    "click on {} intercepted by {}",
                    locator, other
                ))))
            }
        }
        let css = mark(self, locator).await?;
        Page::click(self, &css).await?;
        Ok(())
    }

    async fn dispatch_click(&self, locator: &Locator) -> Result<()> {
        let js = script(locator, "if (!el) return false; el.click(); return true;")?;
        let clicked: bool = self.evaluate(&js).await?;
        if clicked {
            Ok(())
        } else {
            Err(not_found(locator))
        }
    }

    async fn hover(&self, locator: &Locator) -> Result<()> {
        let center: Option<serde_json::Value> =
            self.evaluate(&script(locator, CENTER_JS)?).await?;
        let center = center.ok_or_else(|| not_found(locator))?;
        let x = center["x"].as_f64().unwrap_or(0.0);
        let y = center["y"].as_f64().unwrap_or(0.0);
        self.session()
            .dispatch_mouse_event(eoka::cdp::MouseEventType::MouseMoved, x, y, None, None)
            .await?;
        Ok(())
    }

    async fn clear(&self, locator: &Locator) -> Result<()> {
        let css = mark(self, locator).await?;
        self.fill(&css, "").await?;
        Ok(())
    }

    async fn type_into(&self, locator: &Locator, text: &str) -> Result<()> {
        let css = mark(self, locator).await?;
        let current: String = self
            .evaluate(&format!(
                "document.querySelector({})?.value ?? ''",
                serde_json::to_string(&css)?
            ))
            .await?;
        self.fill(&css, &format!("{}{}", current, text)).await?;
        Ok(())
    }

    async fn text_of(&self, locator: &Locator) -> Result<String> {
        let js = script(locator, "return el ? (el.innerText ?? el.textContent ?? '') : null;")?;
        let text: Option<String> = self.evaluate(&js).await?;
        text.ok_or_else(|| not_found(locator))
    }

    async fn value_of(&self, locator: &Locator) -> Result<String> {
        let js = script(
            locator,
            "return el ? String(el.value ?? el.getAttribute('value') ?? '') : null;",
        )?;
        let value: Option<String> = self.evaluate(&js).await?;
        value.ok_or_else(|| not_found(locator))
    }

    async fn select_by_label(&self, locator: &Locator, label: &str) -> Result<bool> {
        let body = format!(
            r#"
            if (!el || !el.options) return 'element_not_found';
            const want = {label}.trim();
            const opt = Array.from(el.options).find(o => o.text.trim() === want);
            if (!opt) return 'option_not_found';
            el.value = opt.value;
            el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            return 'ok';
            "#,
            label = serde_json::to_string(label)?
        );
        let outcome: String = self.evaluate(&script(locator, &body)?).await?;
        match outcome.as_str() {
            "ok" => Ok(true),
            "option_not_found" => Ok(false),
            _ => Err(not_found(locator)),
        }
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        self.human().press_key(key).await?;
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        Ok(Page::screenshot(self).await?)
    }
}
