//! Prompts sent to the vision models.

/// Recognition instruction for Qing-dynasty vertical-layout pages.
pub const CLASSICAL_OCR_PROMPT: &str = "这是一张清代古籍的图片。请专业地识别其中的所有文字：\n\n\
1. 这是竖排文字，请按照从右到左、从上到下的传统阅读顺序识别\n\
2. 保留所有繁体字、异体字的原貌\n\
3. 识别所有文字，包括正文、注释、批注\n\
4. 不要添加标点符号，保持原文格式\n\
5. 如果有特殊符号或印章，请用[]标注说明\n\
6. 只输出识别的文字内容，不要有任何额外解释";
