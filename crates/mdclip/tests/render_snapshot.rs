use insta::assert_snapshot;
use mdclip::app::document;

#[test]
fn section_renders_as_plain_text() {
    let doc = document::parse(
        "## Demo\n\nSome **bold** text and `code`.\n\n- first\n- second\n",
    );
    let section = doc.section("demo").expect("section exists");

    assert_snapshot!(section.text, @r"
    Some bold text and code.
    first
    second
    ");
}

#[test]
fn nested_sections_render_inside_their_parent() {
    let doc = document::parse("# Guide\n\nStart here.\n\n## Details\n\nMore.\n");
    let section = doc.section("guide").expect("section exists");

    assert_snapshot!(section.text, @r"
    Start here.

    Details
    More.
    ");
}
