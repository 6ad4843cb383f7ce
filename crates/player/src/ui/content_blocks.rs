use dioxus::prelude::*;
use waymark_domain::{Chapter, ContentBlock};

#[component]
pub fn ChapterView(chapter: Chapter) -> Element {
    rsx! {
        section {
            class: "waymark-chapter",
            if let Some(title) = &chapter.title {
                h3 { class: "waymark-chapter-title", "{title}" }
            }
            for (index, block) in chapter.content_blocks.iter().enumerate() {
                ContentBlockView { key: "{index}", block: block.clone() }
            }
        }
    }
}

#[component]
pub fn ContentBlockView(block: ContentBlock) -> Element {
    match block {
        ContentBlock::Paragraph { text } => rsx! {
            p { class: "waymark-paragraph", "{text}" }
        },
        ContentBlock::Quote { text, attribution } => rsx! {
            blockquote {
                class: "waymark-quote",
                "{text}"
                if let Some(attribution) = attribution {
                    cite { class: "waymark-attribution", "- {attribution}" }
                }
            }
        },
        ContentBlock::Image { url, alt } if !url.is_empty() => {
            let alt = alt.unwrap_or_else(|| "Chapter image".to_string());
            rsx! {
                img { class: "waymark-image", src: "{url}", alt: "{alt}" }
            }
        }
        // Chapter videos are listed, not played; the main video is separate.
        ContentBlock::Video { url } if !url.is_empty() => rsx! {
            p { class: "waymark-chapter-video", "[Chapter video: {url}]" }
        },
        _ => rsx! {},
    }
}
