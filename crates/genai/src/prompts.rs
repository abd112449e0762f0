//! Prompt builders for the icon pipeline.
//!
//! Pure functions: context in, prompt text out. Keeping these free of
//! I/O makes the exact wording testable.

/// Prompt asking for a 1-2 sentence app summary from gathered context.
///
/// `context` is a pre-assembled block (process name, homepage excerpt,
/// README excerpt, whatever was available).
pub fn summary_prompt(context: &str) -> String {
    format!(
        "Based on the following information about an application, write a brief \
1-2 sentence summary describing what this app does. Be specific and practical.\n\n\
{context}\n\n\
Write ONLY the summary, nothing else. Keep it under 100 words."
    )
}

/// Prompt asking for a 1-2 sentence summary of an external website.
pub fn website_summary_prompt(name: &str, url: &str) -> String {
    format!(
        "Visit this website and write a brief 1-2 sentence summary describing \
what it is about: {url}\n\n\
The website is named \"{name}\".\n\n\
Write ONLY the summary, nothing else. Keep it under 100 words."
    )
}

/// Prompt asking for a physical-object icon description from a summary.
pub fn icon_description_prompt(name: &str, summary: &str) -> String {
    format!(
        r#"I need to create an app icon for "{name}".

App summary: {summary}

Describe a 3D ISOMETRIC illustration of a SUBSTANTIAL PHYSICAL OBJECT that represents this app.

Requirements:
- Must be a REAL, SOLID, 3D OBJECT - something you could pick up and hold
- Isometric 3D perspective with clear depth, shading, and volume
- ONE main object only (a machine, device, container, tool, furniture, etc.)
- The object must look SUBSTANTIAL and SOLID - not flat, not abstract, not a stream of shapes

Think of chunky physical objects: a 3D printer, a toolbox, a safe, a vending machine, a jukebox, a telescope, a robot, a treasure chest, a globe on a stand, a vintage radio, a filing cabinet, etc.

Examples of GOOD descriptions:
- "A chunky 3D isometric vintage radio with knobs and speaker grille"
- "A solid 3D isometric wooden treasure chest with metal bands and lock"
- "A substantial 3D isometric robot with boxy body and articulated arms"
- "A hefty 3D isometric telescope on a wooden tripod"

BAD examples (DO NOT do these):
- "A letter D" (text is not an object)
- "Flowing beads or particles" (not a solid object)
- "Abstract shapes" (not a physical object)
- "Flat 2D icon" (must be clearly 3D with depth)

Respond with ONLY the object description (1 sentence describing the 3D object), nothing else. Do NOT mention the background."#
    )
}

/// Rendering requirements appended to every generated icon description.
///
/// The flat high-contrast background is what makes the later
/// background-removal stage reliable.
const ICON_PROMPT_SUFFIX: &str = r#"MANDATORY REQUIREMENTS:
- SIZE: This will display as a TINY 32x32 pixel icon. Use BOLD, SIMPLE shapes only. NO fine details, NO small text, NO intricate patterns. Think chunky and iconic.
- Background: COMPLETELY FLAT solid color (bright teal, coral, orange, or purple). NO gradients, NO lighting effects, NO shadows on background, NO variation whatsoever. The background must be a single uniform color designed to be easily removed.
- Object: Rendered in 3D isometric style with clear depth and shading ON THE OBJECT ONLY.
- The background color must be VERY DIFFERENT from any color in the object (high contrast).
- Fill the frame - object as large as possible."#;

/// Combine a generated object description with the mandatory rendering
/// requirements into the final image prompt.
pub fn finalize_icon_prompt(description: &str) -> String {
    format!("{}\n\n{ICON_PROMPT_SUFFIX}", description.trim())
}

/// Assemble the summary context block for a process.
pub fn process_context(
    name: &str,
    homepage_excerpt: Option<&str>,
    readme_excerpt: Option<&str>,
) -> String {
    let mut parts = vec![format!("Process name: {name}")];
    if let Some(homepage) = homepage_excerpt {
        parts.push(format!("Homepage HTML (excerpt):\n{homepage}"));
    }
    if let Some(readme) = readme_excerpt {
        parts.push(format!("README content:\n{readme}"));
    }
    parts.join("\n\n")
}
