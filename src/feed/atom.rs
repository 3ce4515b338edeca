//! Atom 1.0 output

use super::FeedDocument;

pub(super) fn write(doc: &FeedDocument) -> String {
    let mut feed = String::new();
    feed.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
    feed.push('\n');
    feed.push_str(&format!(
        "<feed xmlns=\"http://www.w3.org/2005/Atom\" xml:lang=\"{}\">\n",
        escape_xml(&doc.language)
    ));
    feed.push_str(&format!("  <id>{}/</id>\n", escape_xml(&doc.link)));
    feed.push_str(&format!("  <title>{}</title>\n", escape_xml(&doc.title)));
    feed.push_str(&format!(
        "  <subtitle>{}</subtitle>\n",
        escape_xml(&doc.description)
    ));
    feed.push_str(&format!(
        "  <updated>{}</updated>\n",
        doc.updated.to_rfc3339()
    ));
    feed.push_str(&format!(
        "  <generator>{}</generator>\n",
        escape_xml(&doc.generator)
    ));
    feed.push_str(&format!("  <link rel=\"alternate\" href=\"{}\"/>\n", escape_xml(&doc.link)));
    feed.push_str(&format!(
        "  <link rel=\"self\" href=\"{}\"/>\n",
        escape_xml(&doc.self_link)
    ));
    feed.push_str(&format!(
        "  <rights>{}</rights>\n",
        escape_xml(&doc.copyright)
    ));
    feed.push_str(&author(doc, "  "));

    for entry in &doc.entries {
        feed.push_str("  <entry>\n");
        feed.push_str(&format!("    <title type=\"html\">{}</title>\n", escape_xml(&entry.title)));
        feed.push_str(&format!("    <id>{}</id>\n", escape_xml(&entry.link)));
        feed.push_str(&format!("    <link href=\"{}\"/>\n", escape_xml(&entry.link)));
        feed.push_str(&format!(
            "    <published>{}</published>\n",
            entry.date.to_rfc3339()
        ));
        feed.push_str(&format!(
            "    <updated>{}</updated>\n",
            entry.date.to_rfc3339()
        ));
        feed.push_str(&format!(
            "    <summary type=\"html\">{}</summary>\n",
            escape_xml(&strip_invalid_xml_chars(&entry.summary))
        ));
        feed.push_str(&format!(
            "    <content type=\"html\"><![CDATA[{}]]></content>\n",
            cdata_safe(&strip_invalid_xml_chars(&entry.content))
        ));
        feed.push_str(&author(doc, "    "));
        for category in &entry.categories {
            feed.push_str(&format!(
                "    <category term=\"{}\"/>\n",
                escape_xml(category)
            ));
        }
        if let Some(image) = &entry.image {
            feed.push_str(&format!(
                "    <link rel=\"enclosure\" href=\"{}\"/>\n",
                escape_xml(image)
            ));
        }
        feed.push_str("  </entry>\n");
    }

    feed.push_str("</feed>\n");
    feed
}

fn author(doc: &FeedDocument, indent: &str) -> String {
    format!(
        "{indent}<author>\n{indent}  <name>{}</name>\n{indent}  <email>{}</email>\n{indent}  <uri>{}</uri>\n{indent}</author>\n",
        escape_xml(&doc.author_name),
        escape_xml(&doc.author_email),
        escape_xml(&doc.author_link),
        indent = indent
    )
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Split any `]]>` so the text can sit inside a CDATA section
fn cdata_safe(s: &str) -> String {
    s.replace("]]>", "]]]]><![CDATA[>")
}

/// Strip characters XML 1.0 does not allow (keeps tab, newline, carriage return)
fn strip_invalid_xml_chars(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            c == '\t'
                || c == '\n'
                || c == '\r'
                || ('\u{0020}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
                || ('\u{10000}'..='\u{10FFFF}').contains(&c)
        })
        .collect()
}
