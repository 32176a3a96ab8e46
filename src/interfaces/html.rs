use crate::application::gateway::PurchaseForm;
use html_escape::encode_double_quoted_attribute as attr;

/// Renders a purchase as a self-submitting HTML page.
///
/// Every field becomes a hidden input, repeated names included, in field map
/// order. The page posts to the gateway endpoint as soon as it loads.
pub fn render_purchase_form(form: &PurchaseForm) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"></head>\n");
    html.push_str("<body onload=\"document.forms[0].submit()\">\n");
    html.push_str(&format!(
        "<form method=\"post\" action=\"{}\" accept-charset=\"utf-8\">\n",
        attr(form.endpoint.as_str())
    ));
    for (name, value) in form.fields.iter() {
        html.push_str(&format!(
            "  <input type=\"hidden\" name=\"{}\" value=\"{}\">\n",
            attr(name),
            attr(value)
        ));
    }
    html.push_str("  <noscript><button type=\"submit\">Pay</button></noscript>\n");
    html.push_str("</form>\n</body>\n</html>\n");
    html
}
