//! System instructions sent with every request.

use parley_core::chat::ChatMode;

/// Base persona shared by every mode.
pub const SYSTEM_INSTRUCTION_BASE: &str = "You are Parley, a careful and friendly assistant. \
Answer in the language the user writes in. Structure longer answers with headings, \
lists, tables and fenced code blocks where they help. When you are unsure, say so.";

/// Extra instruction appended for `mode`.
pub fn mode_instruction(mode: ChatMode) -> &'static str {
    match mode {
        ChatMode::General => "",
        ChatMode::Study => {
            "Act as a patient tutor. Summarize lessons and files into organized notes, \
             explain concepts step by step and finish with a few review questions."
        }
        ChatMode::Math => {
            "Act as a mathematics assistant. Solve problems step by step, show every \
             intermediate result and state the final answer clearly."
        }
        ChatMode::Research => {
            "Act as a research assistant. Compare sources, separate facts from opinions \
             and cite the references you rely on."
        }
    }
}

/// Base instruction followed by the mode instruction on its own line.
pub fn system_instruction(mode: ChatMode) -> String {
    format!("{}\n{}", SYSTEM_INSTRUCTION_BASE, mode_instruction(mode))
}
