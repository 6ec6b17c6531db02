use std::collections::HashSet;
use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use semlink_types::{MappingCollection, RoleMap, VnMapping};
use tracing::debug;

use crate::MappingError;

const PREDICATE: &[u8] = b"predicate";
const ARGMAP: &[u8] = b"argmap";
const ROLE: &[u8] = b"role";

/// Streams `predicate > argmap > role` elements into a [`MappingCollection`].
///
/// Each lemma may appear once per file and each PropBank argument once per
/// argmap; either violation aborts the load.
#[derive(Debug, Default)]
pub struct MappingLoader {
    seen_lemmas: HashSet<String>,
    lemma: Option<String>,
    argmap: Option<VnMapping>,
    argmaps_for_lemma: usize,
    collection: MappingCollection,
}

impl MappingLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a whole document and return the roleset-keyed mappings.
    pub fn read<R: BufRead>(mut self, source: R) -> Result<MappingCollection, MappingError> {
        let mut reader = Reader::from_reader(source);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => self.open(&e)?,
                Event::Empty(e) => {
                    self.open(&e)?;
                    self.close(e.name().as_ref());
                }
                Event::End(e) => self.close(e.name().as_ref()),
                Event::Eof => break,
                _ => {}
            }
        }
        Ok(self.collection)
    }

    fn open(&mut self, e: &BytesStart<'_>) -> Result<(), MappingError> {
        match e.name().as_ref() {
            PREDICATE => {
                let lemma = attribute(e, "predicate", "lemma")?;
                if !self.seen_lemmas.insert(lemma.clone()) {
                    return Err(MappingError::DuplicateLemma { lemma });
                }
                self.lemma = Some(lemma);
                self.argmaps_for_lemma = 0;
            }
            ARGMAP => {
                let Some(lemma) = &self.lemma else {
                    return Ok(());
                };
                let roleset = attribute(e, "argmap", "pb-roleset")?;
                let vncls = attribute(e, "argmap", "vn-class")?;
                self.argmap = Some(VnMapping::new(lemma.clone(), roleset, vncls, RoleMap::new()));
            }
            ROLE => {
                let Some(mapping) = self.argmap.as_mut() else {
                    return Ok(());
                };
                let pb_arg = attribute(e, "role", "pb-arg")?;
                let vn_theta = attribute(e, "role", "vn-theta")?;
                if mapping.rolemap.contains_key(&pb_arg) {
                    return Err(MappingError::NonDeterministicMapping {
                        lemma: mapping.lemma.clone(),
                        roleset: mapping.roleset.clone(),
                        arg: pb_arg,
                    });
                }
                mapping.rolemap.insert(pb_arg, vn_theta);
            }
            _ => {}
        }
        Ok(())
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            PREDICATE => {
                if let Some(lemma) = self.lemma.take() {
                    debug!("{lemma}: {} argmaps", self.argmaps_for_lemma);
                }
            }
            ARGMAP => {
                if let Some(mapping) = self.argmap.take() {
                    self.argmaps_for_lemma += 1;
                    self.collection.push(mapping);
                }
            }
            _ => {}
        }
    }
}

fn attribute(
    e: &BytesStart<'_>,
    element: &'static str,
    name: &'static str,
) -> Result<String, MappingError> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == name.as_bytes() {
            return Ok(attr.unescape_value()?.into_owned());
        }
    }
    Err(MappingError::MissingAttribute {
        element,
        attribute: name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(xml: &str) -> Result<MappingCollection, MappingError> {
        MappingLoader::new().read(xml.as_bytes())
    }

    #[test]
    fn loads_nested_argmaps() {
        let coll = load(
            r#"<?xml version="1.0" encoding="utf-8"?>
<pbvn-typemap>
  <predicate lemma="give">
    <argmap pb-roleset="give.01" vn-class="13.1">
      <role pb-arg="0" vn-theta="Agent"/>
      <role pb-arg="1" vn-theta="Theme"/>
      <role pb-arg="2" vn-theta="Recipient"/>
    </argmap>
    <argmap pb-roleset="give.01" vn-class="13.1-1"/>
  </predicate>
  <predicate lemma="hand">
    <argmap pb-roleset="give.01" vn-class="11.1">
      <role pb-arg="2" vn-theta="Destination"/>
    </argmap>
  </predicate>
</pbvn-typemap>"#,
        )
        .unwrap();

        let give = coll.get("give.01");
        assert_eq!(give.len(), 3);
        assert_eq!(give[0].lemma, "give");
        assert_eq!(give[0].vncls, "13.1");
        assert_eq!(give[0].rolemap["2"], "Recipient");
        assert!(give[1].rolemap.is_empty());
        assert_eq!(give[2].lemma, "hand");
        assert_eq!(give[2].rolemap["2"], "Destination");
    }

    #[test]
    fn duplicate_lemma_is_fatal() {
        let err = load(
            r#"<m><predicate lemma="give"/><predicate lemma="give"></predicate></m>"#,
        )
        .unwrap_err();
        assert!(matches!(err, MappingError::DuplicateLemma { lemma } if lemma == "give"));
    }

    #[test]
    fn duplicate_argument_is_fatal() {
        let err = load(
            r#"<m><predicate lemma="give"><argmap pb-roleset="give.01" vn-class="13.1">
                <role pb-arg="1" vn-theta="Theme"/><role pb-arg="1" vn-theta="Recipient"/>
               </argmap></predicate></m>"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            MappingError::NonDeterministicMapping { ref arg, .. } if arg == "1"
        ));
    }

    #[test]
    fn same_argument_in_different_argmaps_is_fine() {
        let coll = load(
            r#"<m><predicate lemma="give">
                <argmap pb-roleset="give.01" vn-class="13.1"><role pb-arg="1" vn-theta="Theme"/></argmap>
                <argmap pb-roleset="give.01" vn-class="13.1-1"><role pb-arg="1" vn-theta="Theme"/></argmap>
               </predicate></m>"#,
        )
        .unwrap();
        assert_eq!(coll.len(), 2);
    }

    #[test]
    fn missing_attribute_is_reported() {
        let err = load(r#"<m><predicate lemma="give"><argmap vn-class="13.1"/></predicate></m>"#)
            .unwrap_err();
        assert!(matches!(
            err,
            MappingError::MissingAttribute {
                element: "argmap",
                attribute: "pb-roleset"
            }
        ));
    }

    #[test]
    fn elements_outside_their_parent_are_ignored() {
        let coll = load(
            r#"<m><argmap pb-roleset="x.01" vn-class="1"/><role pb-arg="0" vn-theta="Agent"/></m>"#,
        )
        .unwrap();
        assert!(coll.is_empty());
    }

    #[test]
    fn unescapes_attribute_values() {
        let coll = load(
            r#"<m><predicate lemma="a&amp;b"><argmap pb-roleset="a.01" vn-class="1"/></predicate></m>"#,
        )
        .unwrap();
        assert_eq!(coll.get("a.01")[0].lemma, "a&b");
    }
}
