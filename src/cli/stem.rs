//! Stem command: show how words reduce to stems

use crate::config::ProjectConfig;
use crate::text::Tokenizer;
use anyhow::Result;
use console::style;

pub fn run(config: &ProjectConfig, words: &[String]) -> Result<()> {
    let tokenizer = Tokenizer::english(config.extra_stop_words()?);
    for word in words {
        let stem = tokenizer.stem(word);
        if tokenizer.is_stop_word(word) {
            println!("{}\t{}\t{}", word, stem, style("(stop word)").dim());
        } else {
            println!("{}\t{}", word, stem);
        }
    }
    Ok(())
}
